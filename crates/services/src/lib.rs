#![forbid(unsafe_code)]

pub mod app_services;
pub mod book_service;
pub mod error;
pub mod genre_service;
pub mod goal_service;
pub mod list_service;
pub mod reading_service;
pub mod stats_service;

pub use reading_core::Clock;

pub use app_services::AppServices;
pub use book_service::BookService;
pub use error::{
    AppServicesError, BookServiceError, GenreServiceError, GoalServiceError, ListServiceError,
    ReadingServiceError, StatsServiceError,
};
pub use genre_service::GenreService;
pub use goal_service::{GoalOverviewItem, GoalService};
pub use list_service::ListService;
pub use reading_service::{BookHistory, LoggedReading, ReadingService};
pub use stats_service::{DashboardView, MonthView, StatsService};
