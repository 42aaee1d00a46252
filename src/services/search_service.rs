use rust_decimal::Decimal;

use crate::{
    ai_search::{Interpretation, ModelFilters, QueryInterpreter},
    dto::search::{AiSearchResult, AppliedFilters},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
};

/// Translate a shopper's free text into catalog filters. Interpreter failures
/// turn into a substring search on the original text, never into an error.
pub async fn smart_search(
    interpreter: &QueryInterpreter,
    query: &str,
) -> AppResult<ApiResponse<AiSearchResult>> {
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".into()));
    }

    let result = match interpreter.interpret(query).await {
        Interpretation::Fallback {
            error,
            fallback_term,
        } => {
            tracing::warn!(
                input_text = %query,
                ai_success = false,
                fallback_applied = true,
                error_detail = %error,
                "smart search fallback"
            );
            fallback_result(fallback_term)
        }
        Interpretation::Filters(filters) => {
            let result = filters_result(filters);
            tracing::info!(
                input_text = %query,
                ai_success = true,
                fallback_applied = false,
                output_filters = ?result.applied_filters,
                "smart search: {}",
                result.interpretation
            );
            result
        }
    };

    Ok(ApiResponse::success(
        "Search interpreted",
        result,
        Some(Meta::empty()),
    ))
}

fn fallback_result(term: String) -> AiSearchResult {
    AiSearchResult {
        interpretation: format!("Smart search unavailable. Showing results for: '{term}'"),
        applied_filters: AppliedFilters {
            search: Some(term),
            ..Default::default()
        },
        is_fallback: true,
    }
}

/// `keywords` from the model becomes the listing endpoint's `search` filter.
fn filters_result(filters: ModelFilters) -> AiSearchResult {
    let applied = AppliedFilters {
        category: filters.category,
        price_min: filters.price_min,
        price_max: filters.price_max,
        search: filters.keywords,
    };
    AiSearchResult {
        interpretation: describe(&applied),
        applied_filters: applied,
        is_fallback: false,
    }
}

fn describe(filters: &AppliedFilters) -> String {
    let mut parts = Vec::new();
    if let Some(category) = &filters.category {
        parts.push(format!("Category: {category}"));
    }
    if let Some(price_min) = filters.price_min {
        parts.push(format!("Price ≥ {}", display_price(price_min)));
    }
    if let Some(price_max) = filters.price_max {
        parts.push(format!("Price ≤ {}", display_price(price_max)));
    }
    if let Some(search) = &filters.search {
        parts.push(format!("Terms: '{search}'"));
    }

    if parts.is_empty() {
        "Results for: all products".to_string()
    } else {
        format!("Results for: {}", parts.join("; "))
    }
}

fn display_price(price: Decimal) -> String {
    price.normalize().to_string()
}
