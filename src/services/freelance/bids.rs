use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::notifications::notify;
use super::projects::load_project;
use super::{Actor, FreelanceService};
use crate::database::models::freelance::{
    Bid, BidStatus, BidWithFreelancer, BidWithProject, NotificationKind, PlaceBid, Project, ProjectStatus, UpdateBid,
};
use crate::services::{require_text, ServiceError, ServiceResult};

fn check_amount(field: &'static str, amount: Decimal) -> ServiceResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

impl FreelanceService {
    /// Bid on an open project; the client gets a notification.
    pub async fn place_bid(&self, freelancer_id: Uuid, request: PlaceBid) -> ServiceResult<Bid> {
        require_text("proposal", &request.proposal)?;
        check_amount("bid_amount", request.bid_amount)?;

        let mut tx = self.pool.begin().await?;

        let project = load_project(&mut *tx, request.project_id).await?;
        if project.status != ProjectStatus::Open {
            return Err(ServiceError::Validation("Project is not open for bidding".to_string()));
        }

        let bid = sqlx::query_as::<_, Bid>(
            "INSERT INTO freelance.bids (project_id, freelancer_id, proposal, bid_amount)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(project.id)
        .bind(freelancer_id)
        .bind(request.proposal.trim())
        .bind(request.bid_amount)
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut *tx,
            project.client_id,
            NotificationKind::Bid,
            format!("New bid of {} on \"{}\"", bid.bid_amount, project.title),
        )
        .await?;

        tx.commit().await?;
        info!("Bid {} placed on project {}", bid.id, project.id);
        Ok(bid)
    }

    pub async fn my_bids(&self, freelancer_id: Uuid) -> ServiceResult<Vec<BidWithProject>> {
        let bids = sqlx::query_as::<_, BidWithProject>(
            "SELECT b.*, p.title AS project_title, p.status AS project_status
             FROM freelance.bids b
             JOIN freelance.projects p ON p.id = b.project_id
             WHERE b.freelancer_id = $1
             ORDER BY b.created_at DESC",
        )
        .bind(freelancer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bids)
    }

    /// Bids on a project, visible to its client and to admins.
    pub async fn project_bids(&self, actor: Actor, project_id: Uuid) -> ServiceResult<Vec<BidWithFreelancer>> {
        let mut conn = self.pool.acquire().await?;
        let project = load_project(&mut *conn, project_id).await?;
        if !actor.is_admin() && project.client_id != actor.id {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }

        let bids = sqlx::query_as::<_, BidWithFreelancer>(
            "SELECT b.*, u.name AS freelancer_name, u.skills AS freelancer_skills
             FROM freelance.bids b
             JOIN freelance.users u ON u.id = b.freelancer_id
             WHERE b.project_id = $1
             ORDER BY b.bid_amount, b.created_at",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(bids)
    }

    /// The bidding freelancer revises a bid that is still pending.
    pub async fn update_bid(&self, freelancer_id: Uuid, bid_id: Uuid, update: UpdateBid) -> ServiceResult<Bid> {
        if let Some(proposal) = &update.proposal {
            require_text("proposal", proposal)?;
        }
        if let Some(amount) = update.bid_amount {
            check_amount("bid_amount", amount)?;
        }

        let bid = self.load_bid(bid_id).await?;
        if bid.freelancer_id != freelancer_id {
            return Err(ServiceError::Forbidden("Not authorized to update this bid".to_string()));
        }
        if bid.status != BidStatus::Pending {
            return Err(ServiceError::Validation(format!("Bid is already {}", bid.status)));
        }

        let bid = sqlx::query_as::<_, Bid>(
            "UPDATE freelance.bids SET proposal = $2, bid_amount = $3, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(bid_id)
        .bind(update.proposal.map(|p| p.trim().to_string()).unwrap_or(bid.proposal))
        .bind(update.bid_amount.unwrap_or(bid.bid_amount))
        .fetch_one(&self.pool)
        .await?;
        Ok(bid)
    }

    pub async fn counter_bid(&self, client_id: Uuid, bid_id: Uuid, counter_offer: Decimal) -> ServiceResult<Bid> {
        check_amount("counter_offer", counter_offer)?;

        let mut tx = self.pool.begin().await?;
        let (bid, project) = self.bid_for_client(&mut tx, client_id, bid_id).await?;

        let bid = sqlx::query_as::<_, Bid>(
            "UPDATE freelance.bids SET counter_offer = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(bid.id)
        .bind(counter_offer)
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut *tx,
            bid.freelancer_id,
            NotificationKind::Bid,
            format!("Counter offer of {} on \"{}\"", counter_offer, project.title),
        )
        .await?;

        tx.commit().await?;
        Ok(bid)
    }

    /// Accept or reject a bid; the freelancer gets a notification.
    pub async fn decide_bid(&self, client_id: Uuid, bid_id: Uuid, status: BidStatus) -> ServiceResult<Bid> {
        if status == BidStatus::Pending {
            return Err(ServiceError::invalid("status", "must be accepted or rejected"));
        }

        let mut tx = self.pool.begin().await?;
        let (bid, project) = self.bid_for_client(&mut tx, client_id, bid_id).await?;

        let bid = sqlx::query_as::<_, Bid>(
            "UPDATE freelance.bids SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(bid.id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut *tx,
            bid.freelancer_id,
            NotificationKind::Bid,
            format!("Your bid on \"{}\" was {}", project.title, status),
        )
        .await?;

        tx.commit().await?;
        info!("Bid {} {}", bid.id, status);
        Ok(bid)
    }

    async fn load_bid(&self, bid_id: Uuid) -> ServiceResult<Bid> {
        sqlx::query_as::<_, Bid>("SELECT * FROM freelance.bids WHERE id = $1")
            .bind(bid_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bid"))
    }

    async fn bid_for_client(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        client_id: Uuid,
        bid_id: Uuid,
    ) -> ServiceResult<(Bid, Project)> {
        let bid = sqlx::query_as::<_, Bid>("SELECT * FROM freelance.bids WHERE id = $1 FOR UPDATE")
            .bind(bid_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bid"))?;
        let project = load_project(&mut **tx, bid.project_id).await?;
        if project.client_id != client_id {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }
        Ok((bid, project))
    }
}
