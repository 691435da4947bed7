//! Wolt consumer-API catalog provider.
//!
//! Resolves the configured city slugs to coordinates, fetches each city's
//! restaurant page, and tags every venue with the city it was found under.
//! Enrichment hits the per-venue dynamic endpoint for the open/closed flag.

use futures::future::join_all;
use serde::Deserialize;
use tracing::warn;

use venuewatch_core::config::WoltConfig;
use venuewatch_core::Venue;

use crate::provider::{CatalogError, CatalogProvider};

// ── Upstream wire shapes ──────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    results: Vec<RawCity>,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    slug: String,
    location: RawLocation,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    /// `[lon, lat]`, GeoJSON order.
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct CityPageResponse {
    sections: Vec<PageSection>,
}

#[derive(Debug, Deserialize)]
struct PageSection {
    #[serde(default)]
    items: Vec<PageItem>,
}

#[derive(Debug, Deserialize)]
struct PageItem {
    title: String,
    venue: RawVenue,
}

#[derive(Debug, Deserialize)]
struct RawVenue {
    id: String,
    online: bool,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct DynamicVenueResponse {
    venue: DynamicVenue,
}

#[derive(Debug, Deserialize)]
struct DynamicVenue {
    open_status: OpenStatus,
}

#[derive(Debug, Deserialize)]
struct OpenStatus {
    is_open: bool,
}

/// A supported city with resolved coordinates.
#[derive(Debug, Clone)]
struct City {
    slug: String,
    lat: f64,
    lon: f64,
}

/// Map one city's restaurant page into venues tagged with the city slug.
///
/// The restaurant list lives in the page's second section; the first is
/// promotional content.
fn parse_city_page(page: CityPageResponse, area: &str) -> Result<Vec<Venue>, CatalogError> {
    let section = page
        .sections
        .into_iter()
        .nth(1)
        .ok_or_else(|| CatalogError::Malformed(format!("city page for '{}' has no venue section", area)))?;

    Ok(section
        .items
        .into_iter()
        .map(|item| Venue {
            id: item.venue.id,
            name: item.title,
            is_online: item.venue.online,
            is_open: None,
            area: area.to_string(),
            slug: item.venue.slug,
        })
        .collect())
}

/// Wolt consumer-API implementation of [`CatalogProvider`].
pub struct WoltProvider {
    client: reqwest::Client,
    config: WoltConfig,
}

impl WoltProvider {
    pub fn new(config: WoltConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Resolve the configured city slugs to coordinates.
    async fn fetch_cities(&self) -> Result<Vec<City>, CatalogError> {
        let response: CitiesResponse = self
            .client
            .get(&self.config.cities_base_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .results
            .into_iter()
            .filter(|city| self.config.city_slugs.iter().any(|s| s == &city.slug))
            .map(|city| City {
                slug: city.slug,
                lon: city.location.coordinates[0],
                lat: city.location.coordinates[1],
            })
            .collect())
    }

    async fn fetch_city_venues(&self, city: &City) -> Result<Vec<Venue>, CatalogError> {
        let url = format!(
            "{}?lat={}&lon={}",
            self.config.restaurants_base_url, city.lat, city.lon
        );
        let page: CityPageResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_city_page(page, &city.slug)
    }

    async fn fetch_open_status(&self, venue: &Venue) -> Result<bool, CatalogError> {
        let url = self.config.venue_base_url.replace("{slug}", &venue.slug);
        let response: DynamicVenueResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.venue.open_status.is_open)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for WoltProvider {
    /// Fetch the venue list for every configured city.
    ///
    /// A single failing city page is skipped with a warning; only a failed
    /// city resolution fails the whole fetch.
    async fn fetch_catalog(&self) -> Result<Vec<Venue>, CatalogError> {
        let cities = self.fetch_cities().await?;
        if cities.is_empty() {
            return Err(CatalogError::Malformed(
                "no configured city found in upstream city list".to_string(),
            ));
        }

        let pages = join_all(cities.iter().map(|city| self.fetch_city_venues(city))).await;

        let mut venues = Vec::new();
        for (city, page) in cities.iter().zip(pages) {
            match page {
                Ok(mut city_venues) => venues.append(&mut city_venues),
                Err(e) => warn!(city = %city.slug, error = %e, "Skipping city page"),
            }
        }
        Ok(venues)
    }

    /// Fill `is_open` per venue. Venues whose dynamic endpoint fails keep
    /// `is_open = None`.
    async fn enrich(&self, venues: Vec<Venue>) -> Vec<Venue> {
        let statuses = join_all(venues.iter().map(|v| self.fetch_open_status(v))).await;

        venues
            .into_iter()
            .zip(statuses)
            .map(|(mut venue, status)| {
                match status {
                    Ok(is_open) => venue.is_open = Some(is_open),
                    Err(e) => warn!(venue = %venue.name, error = %e, "Venue enrichment failed"),
                }
                venue
            })
            .collect()
    }

    fn venue_link(&self, venue: &Venue) -> String {
        self.config
            .venue_link_base_url
            .replace("{area}", &venue.area)
            .replace("{slug}", &venue.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wolt_config() -> WoltConfig {
        WoltConfig {
            restaurants_base_url: "https://consumer-api.wolt.com/v1/pages/restaurants".to_string(),
            venue_base_url:
                "https://consumer-api.wolt.com/order-xp/web/v1/venue/slug/{slug}/dynamic/".to_string(),
            venue_link_base_url: "https://wolt.com/en/isr/{area}/restaurant/{slug}".to_string(),
            cities_base_url: "https://restaurant-api.wolt.com/v1/cities".to_string(),
            city_slugs: vec!["tel-aviv".to_string()],
            search_cap: 7,
        }
    }

    #[test]
    fn parse_city_page_takes_second_section() {
        let page: CityPageResponse = serde_json::from_value(serde_json::json!({
            "sections": [
                { "items": [] },
                { "items": [
                    { "title": "Pizza X", "venue": { "id": "v1", "online": true, "slug": "px" } },
                    { "title": "Sushi Bar", "venue": { "id": "v2", "online": false, "slug": "sushi-bar" } }
                ] }
            ]
        }))
        .unwrap();

        let venues = parse_city_page(page, "tel-aviv").unwrap();
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].name, "Pizza X");
        assert!(venues[0].is_online);
        assert_eq!(venues[0].area, "tel-aviv");
        assert_eq!(venues[1].slug, "sushi-bar");
        assert!(venues.iter().all(|v| v.is_open.is_none()));
    }

    #[test]
    fn parse_city_page_rejects_missing_section() {
        let page: CityPageResponse =
            serde_json::from_value(serde_json::json!({ "sections": [ { "items": [] } ] })).unwrap();
        let err = parse_city_page(page, "tel-aviv").unwrap_err();
        assert!(err.to_string().contains("tel-aviv"));
    }

    #[test]
    fn venue_link_fills_area_and_slug() {
        let provider = WoltProvider::new(wolt_config());
        let venue = Venue {
            id: "v1".to_string(),
            name: "Pizza X".to_string(),
            is_online: true,
            is_open: None,
            area: "tel-aviv".to_string(),
            slug: "px".to_string(),
        };
        assert_eq!(
            provider.venue_link(&venue),
            "https://wolt.com/en/isr/tel-aviv/restaurant/px"
        );
    }

    #[test]
    fn cities_response_parses_geojson_order() {
        let response: CitiesResponse = serde_json::from_value(serde_json::json!({
            "results": [
                { "slug": "tel-aviv", "location": { "coordinates": [34.78, 32.08] } },
                { "slug": "oslo", "location": { "coordinates": [10.75, 59.91] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].location.coordinates[0], 34.78);
    }
}
