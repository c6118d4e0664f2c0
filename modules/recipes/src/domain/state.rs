//! Pagination state machine as a pure reducer.
//!
//! `reduce` never performs I/O. It returns the next snapshot plus, at most,
//! one fetch to issue. Completions carry the generation they were issued
//! under and are discarded unless it is still current.

use std::collections::HashSet;

use query_core::ResultPage;

use crate::contract::error::{ControllerError, StoreError};
use crate::contract::model::{
    AccessLevel, Document, FetchMode, PaginationState, QueryParams, Status,
};

#[derive(Debug, Clone)]
pub enum Event {
    /// Any parameter edit: filters, order, page size, access level or refresh.
    ParamsChanged {
        params: QueryParams,
        access: AccessLevel,
    },
    LoadMoreRequested,
    FetchSucceeded {
        generation: u64,
        mode: FetchMode,
        page: ResultPage<Document>,
    },
    FetchFailed {
        generation: u64,
        mode: FetchMode,
        error: StoreError,
    },
}

/// A fetch the caller must issue after committing the new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub mode: FetchMode,
    pub cursor_id: Option<String>,
}

#[derive(Debug, Clone)]
#[must_use]
pub enum Transition {
    Next {
        state: PaginationState,
        fetch: Option<FetchRequest>,
    },
    /// A completion from a superseded generation; state must not change.
    Discarded,
}

pub fn reduce(state: &PaginationState, event: Event) -> Result<Transition, ControllerError> {
    match event {
        Event::ParamsChanged { params, access } => {
            if params.page_size == 0 {
                return Err(ControllerError::InvalidPageSize);
            }
            let generation = state.generation + 1;
            let next = PaginationState {
                params,
                access,
                accumulated: Vec::new(),
                status: Status::Loading(FetchMode::Replace),
                generation,
                has_more: false,
            };
            Ok(Transition::Next {
                state: next,
                fetch: Some(FetchRequest {
                    generation,
                    mode: FetchMode::Replace,
                    cursor_id: None,
                }),
            })
        }

        Event::LoadMoreRequested => {
            if state.is_loading() {
                return Err(ControllerError::AlreadyLoading);
            }
            let cursor_id = state
                .last_cursor()
                .ok_or(ControllerError::NoCursorAvailable)?
                .to_string();
            if !state.has_more {
                return Err(ControllerError::NoMoreResults);
            }
            let next = PaginationState {
                status: Status::Loading(FetchMode::Append),
                ..state.clone()
            };
            Ok(Transition::Next {
                state: next,
                fetch: Some(FetchRequest {
                    generation: state.generation,
                    mode: FetchMode::Append,
                    cursor_id: Some(cursor_id),
                }),
            })
        }

        Event::FetchSucceeded {
            generation,
            mode,
            page,
        } => {
            if !awaiting(state, generation, mode) {
                return Ok(Transition::Discarded);
            }
            let mut next = state.clone();
            if mode == FetchMode::Replace {
                next.accumulated.clear();
            }
            append_unique(&mut next.accumulated, page.items);
            next.has_more = page.page_info.has_more;
            next.status = Status::Loaded;
            Ok(Transition::Next {
                state: next,
                fetch: None,
            })
        }

        Event::FetchFailed {
            generation,
            mode,
            error,
        } => {
            if !awaiting(state, generation, mode) {
                return Ok(Transition::Discarded);
            }
            let next = PaginationState {
                status: Status::Failed(error),
                ..state.clone()
            };
            Ok(Transition::Next {
                state: next,
                fetch: None,
            })
        }
    }
}

/// True only for the single fetch the current generation is waiting on.
fn awaiting(state: &PaginationState, generation: u64, mode: FetchMode) -> bool {
    generation == state.generation && state.status == Status::Loading(mode)
}

fn append_unique(accumulated: &mut Vec<Document>, items: Vec<Document>) {
    let mut seen: HashSet<String> = accumulated.iter().map(|d| d.id.clone()).collect();
    accumulated.extend(items.into_iter().filter(|d| seen.insert(d.id.clone())));
}
