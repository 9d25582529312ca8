use marta_live_transit::identifiers::{RouteIdentifier, StopIdentifier};
use marta_live_transit::models::wire::{RouteDescriptor, UpcomingResponse};
use marta_live_transit::network::{FeedError, FeedFuture, FeedResult, TransitFeed};
use serde::de::DeserializeOwned;

/// [`TransitFeed`] over the server's JSON endpoints.
pub struct HttpFeed {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        }
    }

    pub fn route_url(&self, route: &RouteIdentifier) -> String {
        format!("{}/marta/route/{}.json", self.base_url, route)
    }

    pub fn realtime_url(&self, route: &RouteIdentifier) -> String {
        format!("{}/marta/realtime/{}.json", self.base_url, route)
    }

    pub fn upcoming_url(&self, route: &RouteIdentifier) -> String {
        format!("{}/marta/upcoming/{}.json", self.base_url, route)
    }

    /// Upcoming times for the whole route, or for one stop via `?stop=`.
    pub fn upcoming_request(
        &self,
        route: &RouteIdentifier,
        stop: Option<&StopIdentifier>,
    ) -> reqwest::RequestBuilder {
        let request = self.client.get(self.upcoming_url(route));
        match stop {
            Some(stop) => request.query(&[("stop", stop.as_str())]),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FeedResult<T> {
        self.send_json(self.client.get(url)).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> FeedResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FeedError::NotFound(response.url().to_string()));
        }

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::InvalidData(e.to_string()))
    }
}

impl TransitFeed for HttpFeed {
    fn route<'a>(&'a self, route: &'a RouteIdentifier) -> FeedFuture<'a, RouteDescriptor> {
        Box::pin(async move { self.get_json(&self.route_url(route)).await })
    }

    fn realtime<'a>(
        &'a self,
        route: &'a RouteIdentifier,
    ) -> FeedFuture<'a, Vec<serde_json::Value>> {
        Box::pin(async move { self.get_json(&self.realtime_url(route)).await })
    }

    fn upcoming<'a>(
        &'a self,
        route: &'a RouteIdentifier,
        stop: Option<&'a StopIdentifier>,
    ) -> FeedFuture<'a, UpcomingResponse> {
        Box::pin(async move { self.send_json(self.upcoming_request(route, stop)).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let feed = HttpFeed::new("https://breezeminder.example/");
        let route = RouteIdentifier::new("110");
        let stop = StopIdentifier::new("901229");

        assert_eq!(feed.route_url(&route), "https://breezeminder.example/marta/route/110.json");
        assert_eq!(
            feed.realtime_url(&route),
            "https://breezeminder.example/marta/realtime/110.json"
        );
        assert_eq!(
            feed.upcoming_url(&route),
            "https://breezeminder.example/marta/upcoming/110.json"
        );

        let request = feed.upcoming_request(&route, Some(&stop)).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://breezeminder.example/marta/upcoming/110.json?stop=901229"
        );
    }

    #[test]
    fn test_stop_id_is_query_encoded() {
        let feed = HttpFeed::new("https://breezeminder.example");
        let route = RouteIdentifier::new("110");
        let stop = StopIdentifier::new("A&B 1");

        let request = feed.upcoming_request(&route, Some(&stop)).build().unwrap();
        assert_eq!(request.url().path(), "/marta/upcoming/110.json");
        assert_eq!(request.url().query(), Some("stop=A%26B+1"));

        let whole_route = feed.upcoming_request(&route, None).build().unwrap();
        assert_eq!(whole_route.url().query(), None);
    }
}
