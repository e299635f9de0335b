//! Page-load task group
//!
//! Page load fans out independent fetches with no ordering between them. They
//! only meet in the page containers. The group is fire-and-forget: the UI
//! drains finished tasks on each tick and logs failures, headless mode waits
//! for all of them.

use std::fmt;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

use crate::api::{ApiError, CatalogClient};
use crate::page::events::ClickEvent;
use crate::page::SharedPage;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Count,
    Products,
    Categories,
    ClearCategoryList,
    Category,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Count => "count",
            Operation::Products => "products",
            Operation::Categories => "categories",
            Operation::ClearCategoryList => "clear category list",
            Operation::Category => "category",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct TaskReport {
    pub operation: Operation,
    pub outcome: Result<(), ApiError>,
}

impl TaskReport {
    fn ok(operation: Operation) -> Self {
        Self {
            operation,
            outcome: Ok(()),
        }
    }
}

pub type TaskGroup = JoinSet<TaskReport>;

/// Start every page-load operation in `tasks` without waiting
pub fn spawn_page_load(tasks: &mut TaskGroup, client: Arc<CatalogClient>, page: SharedPage) {
    {
        let (client, page) = (client.clone(), page.clone());
        tasks.spawn(async move {
            TaskReport {
                operation: Operation::Count,
                outcome: render::display_count(&client, &page).await,
            }
        });
    }
    spawn_products(tasks, client.clone(), page.clone());
    {
        let (client, page) = (client.clone(), page.clone());
        tasks.spawn(async move {
            render::product_categories(&client, &page).await;
            TaskReport::ok(Operation::Categories)
        });
    }
    tasks.spawn(async move {
        render::clear_category_list(&page);
        TaskReport::ok(Operation::ClearCategoryList)
    });
}

/// Re-render the product list
pub fn spawn_products(tasks: &mut TaskGroup, client: Arc<CatalogClient>, page: SharedPage) {
    tasks.spawn(async move {
        render::display_products(&client, &page).await;
        TaskReport::ok(Operation::Products)
    });
}

/// Run the category filter for a clicked tag
pub fn spawn_category(
    tasks: &mut TaskGroup,
    client: Arc<CatalogClient>,
    page: SharedPage,
    event: ClickEvent,
) {
    tasks.spawn(async move {
        TaskReport {
            operation: Operation::Category,
            outcome: render::display_category(&client, &page, &event).await,
        }
    });
}

fn log_result(result: Result<TaskReport, JoinError>) -> Option<TaskReport> {
    match result {
        Ok(report) => {
            if let Err(e) = &report.outcome {
                tracing::error!("Unhandled error in {}: {}", report.operation, e);
            }
            Some(report)
        }
        Err(e) => {
            tracing::error!("Render task aborted: {}", e);
            None
        }
    }
}

/// Collect tasks that already finished, without blocking
pub fn drain(tasks: &mut TaskGroup) -> Vec<TaskReport> {
    let mut reports = Vec::new();
    while let Some(result) = tasks.try_join_next() {
        if let Some(report) = log_result(result) {
            reports.push(report);
        }
    }
    reports
}

/// Wait for every task in the group
pub async fn join_all(mut tasks: TaskGroup) -> Vec<TaskReport> {
    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        if let Some(report) = log_result(result) {
            reports.push(report);
        }
    }
    reports
}
