#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard;
pub mod document_service;
pub mod error;
pub mod tracking_service;

pub use tracker_core::Clock;

pub use app_services::AppServices;
pub use dashboard::{Dashboard, DashboardService, ProjectHeader, RecordRow};
pub use document_service::DocumentService;
pub use error::{AppServicesError, DocumentServiceError, TrackingError};
pub use tracking_service::TrackingService;
