use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::collection::OrderedItem;
use crate::db::models::{InstagramReview, PortfolioImage};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// One page of a longer list. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

impl Pagination {
    /// Out-of-range requests land on the nearest existing page; an empty
    /// list still has one (empty) page.
    pub fn new(len: usize, requested: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = len.div_ceil(page_size).max(1);
        let page = requested.clamp(1, total_pages);
        let start = ((page - 1) * page_size).min(len);
        let end = (start + page_size).min(len);
        Self {
            page,
            total_pages,
            start,
            end,
        }
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.total_pages)
            .map(|number| PageLink {
                number,
                class: if number == self.page {
                    "page-link current"
                } else {
                    "page-link"
                },
            })
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub class: &'static str,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub images: Vec<OrderedItem<PortfolioImage>>,
    pub reviews: Vec<OrderedItem<InstagramReview>>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
pub struct HomeQuery {
    pub page: Option<usize>,
}

/// GET /?page=N
pub async fn index(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Response {
    let page_size = state.config.site.portfolio_page_size;

    let (images, pagination) = {
        let portfolio = state.portfolio.lock().await;
        let pagination = Pagination::new(portfolio.len(), query.page.unwrap_or(1), page_size);
        (
            portfolio.items()[pagination.start..pagination.end].to_vec(),
            pagination,
        )
    };
    let reviews = state.reviews.lock().await.items().to_vec();

    Html(HomeTemplate {
        images,
        reviews,
        pagination,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_splits_into_pages_of_six() {
        let first = Pagination::new(14, 1, 6);
        assert_eq!((first.start, first.end, first.total_pages), (0, 6, 3));
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = Pagination::new(14, 3, 6);
        assert_eq!((last.start, last.end), (12, 14));
        assert!(!last.has_next());
        let numbers: Vec<usize> = last.links().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(last.links()[2].class, "page-link current");
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        assert_eq!(Pagination::new(14, 0, 6).page, 1);
        assert_eq!(Pagination::new(14, 99, 6).page, 3);

        let empty = Pagination::new(0, 5, 6);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert_eq!((empty.start, empty.end), (0, 0));
    }
}
