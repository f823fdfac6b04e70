use crate::error::{ClientError, Result};
use reqwest::{Method, Url};
use std::fmt;

/// Every backend resource the dashboard reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AirlineInfo(String),
    KeyData(String),
    CityDistribution(String),
    FeatureImportance(String),
    RatingDistribution(String),
    SubItemScoring(String),
    WordcloudData(String),
    Reviews(String),
    TopRated,
    SentimentSubmit,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::SentimentSubmit => Method::POST,
            _ => Method::GET,
        }
    }

    /// Airline the request is scoped to, if any.
    pub fn airline(&self) -> Option<&str> {
        match self {
            Endpoint::AirlineInfo(name)
            | Endpoint::KeyData(name)
            | Endpoint::CityDistribution(name)
            | Endpoint::FeatureImportance(name)
            | Endpoint::RatingDistribution(name)
            | Endpoint::SubItemScoring(name)
            | Endpoint::WordcloudData(name)
            | Endpoint::Reviews(name) => Some(name),
            Endpoint::TopRated | Endpoint::SentimentSubmit => None,
        }
    }

    fn resource(&self) -> &'static str {
        match self {
            Endpoint::AirlineInfo(_) => "info",
            Endpoint::KeyData(_) => "key-data",
            Endpoint::CityDistribution(_) => "city-distribution",
            Endpoint::FeatureImportance(_) => "feature-importance",
            Endpoint::RatingDistribution(_) => "rating-distribution",
            Endpoint::SubItemScoring(_) => "sub-item-scoring",
            Endpoint::WordcloudData(_) => "wordcloud-data",
            Endpoint::Reviews(_) => "reviews",
            Endpoint::TopRated => "top-rated",
            Endpoint::SentimentSubmit => "submit",
        }
    }

    /// Unencoded path segments.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::TopRated => vec!["airlines", "top-rated"],
            Endpoint::SentimentSubmit => vec!["sentiment-tool", "submit"],
            other => match other.airline() {
                Some(name) => vec!["airlines", name, other.resource()],
                None => vec![other.resource()],
            },
        }
    }

    /// Join onto `base`, percent-encoding each segment so an airline name
    /// containing `/`, `?` or spaces stays a single segment.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl {
                    url: base.to_string(),
                    message: "base URL cannot carry a path".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(self.segments());
        }
        url.set_query(None);
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments() {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
