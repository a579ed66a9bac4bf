//! Facility discovery and the resume filter

use crate::browser::Page;
use crate::site::{Facility, SiteAdapter};
use crate::Result;

/// Reads the ordered facility list from a loaded landing page
pub async fn discover_facilities(page: &dyn Page, site: &dyn SiteAdapter) -> Result<Vec<Facility>> {
    let facilities = site.locate_facility_list(page).await?;
    tracing::debug!("found {} homes", facilities.len());
    Ok(facilities)
}

/// Drops every facility before the first one named exactly `start_at`
///
/// With no start name (or an empty one) every facility is kept. If the name
/// never matches, nothing is kept.
pub fn apply_resume_filter(facilities: Vec<Facility>, start_at: Option<&str>) -> Vec<Facility> {
    match start_at.filter(|name| !name.is_empty()) {
        None => facilities,
        Some(name) => {
            let selected: Vec<Facility> = facilities
                .into_iter()
                .skip_while(|facility| facility.name != name)
                .collect();
            if selected.is_empty() {
                tracing::warn!("Start-at home '{}' is not in the directory", name);
            }
            selected
        }
    }
}
