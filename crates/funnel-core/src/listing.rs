//! Record-level campaign listing.

use serde::Serialize;

use crate::{
  filter::{Paging, RawParams, RecordFilter, SortOrder},
  record::CampaignRecord,
  store::{CampaignStore, RecordQuery, RecordSortField},
};

/// Inputs to [`list_campaigns`].
#[derive(Debug, Clone)]
pub struct ListRequest {
  pub filter: RecordFilter,
  pub paging: Paging,
  /// Direction of the `createdAt` ordering; `None` keeps insertion order.
  pub order:  Option<SortOrder>,
}

impl Default for ListRequest {
  fn default() -> Self {
    Self {
      filter: RecordFilter::default(),
      paging: Paging::default(),
      order:  Some(SortOrder::Asc),
    }
  }
}

impl ListRequest {
  pub fn from_params(params: &RawParams) -> Self {
    Self {
      filter: RecordFilter::from_params(params),
      paging: Paging::from_params(params),
      order:  Some(SortOrder::parse_or(params.string("sortOrder"), SortOrder::Asc)),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignList {
  pub campaigns:       Vec<CampaignRecord>,
  pub total_campaigns: u64,
  pub total_pages:     u64,
  pub current_page:    u64,
}

/// One page of records plus the filtered total.
pub async fn list_campaigns<S: CampaignStore>(
  store: &S,
  request: &ListRequest,
) -> Result<CampaignList, S::Error> {
  let query = RecordQuery {
    filter: request.filter.clone(),
    sort:   request.order.map(|order| (RecordSortField::CreatedAt, order)),
    skip:   request.paging.skip(),
    limit:  Some(request.paging.limit),
  };

  let campaigns = store.find_records(&query).await?;
  let total_campaigns = store.count_records(&request.filter).await?;

  Ok(CampaignList {
    campaigns,
    total_campaigns,
    total_pages: request.paging.total_pages(total_campaigns),
    current_page: request.paging.page,
  })
}
