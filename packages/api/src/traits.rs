use async_trait::async_trait;
use common::hackathon::{HackathonStatus, SolutionsStatus};
use common::participation::Participation;
use common::validation::ValidatedSolution;

use crate::error::Result;
use crate::session::Session;

/// The slice of the backend a team dashboard depends on.
#[async_trait]
pub trait HackathonApi: Send + Sync {
    /// The caller's participations, authoritative server state.
    async fn fetch_participations(&self) -> Result<Vec<Participation>>;

    async fn submit_solution(&self, hackathon_id: &str, solution: &ValidatedSolution)
    -> Result<()>;
}

/// The slice of the backend the organizer's auto-close check depends on.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn hackathon_status(&self) -> Result<HackathonStatus>;

    async fn solutions_status(&self) -> Result<SolutionsStatus>;

    async fn close_hackathon(&self, hackathon_id: Option<&str>) -> Result<()>;
}

#[async_trait]
impl HackathonApi for Session {
    async fn fetch_participations(&self) -> Result<Vec<Participation>> {
        self.participations().await
    }

    async fn submit_solution(
        &self,
        hackathon_id: &str,
        solution: &ValidatedSolution,
    ) -> Result<()> {
        Session::submit_solution(self, hackathon_id, solution).await
    }
}

#[async_trait]
impl AdminApi for Session {
    async fn hackathon_status(&self) -> Result<HackathonStatus> {
        Session::hackathon_status(self).await
    }

    async fn solutions_status(&self) -> Result<SolutionsStatus> {
        Session::solutions_status(self).await
    }

    async fn close_hackathon(&self, hackathon_id: Option<&str>) -> Result<()> {
        Session::close_hackathon(self, hackathon_id).await
    }
}
