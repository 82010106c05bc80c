// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::range_service::RangeService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub range_service: RangeService,
}
