use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::specials::repository::{
    NewSpecial, RepositoryError, SpecialRecord, SpecialsRepository,
};
use crate::workflows::specials::store::InMemorySpecialsRepository;
use crate::workflows::specials::{specials_router, SpecialsService};

pub(super) const PIZZA_FLYER: &str = "Tony's Pizza\n$5 off large pies\nValid Friday only";

pub(super) fn weekly_board() -> Vec<String> {
    [
        "Blue Moon Tavern",
        "Monday",
        "Burger special $8",
        "Tuesday",
        "Taco night $6",
        "more tacos",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub(super) fn build_service() -> (
    SpecialsService<InMemorySpecialsRepository>,
    Arc<InMemorySpecialsRepository>,
) {
    let repository = Arc::new(InMemorySpecialsRepository::default());
    let service = SpecialsService::new(repository.clone());
    (service, repository)
}

pub(super) fn router_with_service(
    service: SpecialsService<InMemorySpecialsRepository>,
) -> axum::Router {
    specials_router(Arc::new(service), 20)
}

pub(super) struct UnavailableRepository;

impl SpecialsRepository for UnavailableRepository {
    fn append(&self, _special: NewSpecial) -> Result<SpecialRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn append_all(&self, _specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }
}

/// Accepts one row, then runs out of space. Single appends land one at a
/// time; a batch that would need a second row is refused up front.
#[derive(Default)]
pub(super) struct FailSecondRowRepository {
    pub(super) inner: InMemorySpecialsRepository,
}

impl SpecialsRepository for FailSecondRowRepository {
    fn append(&self, special: NewSpecial) -> Result<SpecialRecord, RepositoryError> {
        if !self.inner.records().is_empty() {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.inner.append(special)
    }

    fn append_all(&self, specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError> {
        if self.inner.records().len() + specials.len() > 1 {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.inner.append_all(specials)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError> {
        self.inner.recent(limit)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_unprocessable(response: &Response) {
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
