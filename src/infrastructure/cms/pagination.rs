use serde_json::Value;

use crate::{
    cms::{query::ContentQuery, wp_client::ContentSource},
    constants::MAX_CMS_PAGES,
    errors::{AppError, FetchError},
    normalizer::expect_array,
};

const INVALID_PAGE_CODE: &str = "rest_post_invalid_page_number";

/// Follows `page=1,2,...` until a page comes back empty or shorter than
/// `page_size`, and returns every item in CMS order.
///
/// WordPress answers a page past the end with a 400
/// `rest_post_invalid_page_number`; that ends the walk too. A total that
/// is an exact multiple of `page_size` costs one extra (empty) request.
pub async fn fetch_all<S>(
    source: &S,
    resource: &str,
    query: &ContentQuery,
    page_size: u32,
) -> Result<Vec<Value>, AppError>
where
    S: ContentSource + ?Sized,
{
    let page_size = page_size.max(1);
    let mut items = Vec::new();

    for page in 1..=MAX_CMS_PAGES {
        let page_query = query.clone().per_page(page_size).page(page);

        let body = match source.fetch(resource, &page_query).await {
            Ok(body) => body,
            Err(FetchError::UpstreamHttp { status: 400, ref body })
                if page > 1 && body.rest_code() == Some(INVALID_PAGE_CODE) =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let batch = expect_array(&body)?;
        let batch_len = batch.len();
        items.extend(batch.iter().cloned());

        if batch_len == 0 || batch_len < page_size as usize {
            break;
        }

        if page == MAX_CMS_PAGES {
            tracing::warn!(resource, pages = MAX_CMS_PAGES, "Stopped paginating at the page cap");
        }
    }

    tracing::debug!(resource, total = items.len(), "Fetched all pages");
    Ok(items)
}
