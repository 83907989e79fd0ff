use papercuts_core::dashboard::{
    CreateSessionRequest, CreateUserRequest, DashboardSession, OrgMetrics, SessionsResponse, User,
    UsersResponse,
};
use papercuts_engine::traits::DashboardApi;
use papercuts_providers::endpoints;
use papercuts_providers::{ApiError, Method, RequestBody, Transport};

use crate::live::not_found_as;

/// Dashboard CRUD over HTTP.
#[derive(Debug, Clone)]
pub struct LiveDashboardApi {
    transport: Transport,
}

impl LiveDashboardApi {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    async fn get_number(&self, path: &str, resource: String) -> Result<f64, ApiError> {
        self.transport
            .request(Method::Get, path, RequestBody::None)
            .await
            .map_err(not_found_as(resource))?
            .into_json::<f64>()
    }
}

#[async_trait::async_trait]
impl DashboardApi for LiveDashboardApi {
    async fn list_sessions(&self, user_id: Option<&str>) -> Result<SessionsResponse, ApiError> {
        self.transport
            .request(
                Method::Get,
                &endpoints::sessions_for_user(user_id),
                RequestBody::None,
            )
            .await?
            .into_json()
    }

    async fn create_session(
        &self,
        req: &CreateSessionRequest,
    ) -> Result<DashboardSession, ApiError> {
        let created: DashboardSession = self
            .transport
            .request(Method::Post, endpoints::SESSIONS, RequestBody::json(req)?)
            .await?
            .into_json()?;
        log::info!("created usage session {} for {}", created.id, created.user_id);
        Ok(created)
    }

    async fn list_users(&self) -> Result<UsersResponse, ApiError> {
        self.transport
            .request(Method::Get, endpoints::USERS, RequestBody::None)
            .await?
            .into_json()
    }

    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, ApiError> {
        let created: User = self
            .transport
            .request(Method::Post, endpoints::USERS, RequestBody::json(req)?)
            .await?
            .into_json()?;
        log::info!("created user {} ({})", created.user_id, created.name);
        Ok(created)
    }

    async fn user_page_total(&self, user_id: &str) -> Result<f64, ApiError> {
        self.get_number(&endpoints::user_page_total(user_id), format!("user {user_id}"))
            .await
    }

    async fn user_ink_total(&self, user_id: &str) -> Result<f64, ApiError> {
        self.get_number(&endpoints::user_ink_total(user_id), format!("user {user_id}"))
            .await
    }

    async fn user_avg_score(&self, user_id: &str) -> Result<f64, ApiError> {
        self.get_number(&endpoints::user_avg_score(user_id), format!("user {user_id}"))
            .await
    }

    async fn org_metrics(&self) -> Result<OrgMetrics, ApiError> {
        self.transport
            .request(Method::Get, endpoints::ORG_METRICS, RequestBody::None)
            .await?
            .into_json()
    }
}
