//! TMDB find-response types.
//!
//! The find endpoint returns movie and TV results in separate arrays with
//! different field sets. [`MediaDetails`] unifies them behind shared accessors.

use serde::{Deserialize, Serialize};

/// Top-level find response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FindResponse {
    pub movie_results: Vec<MovieDetails>,
    pub tv_results: Vec<TvDetails>,
}

impl FindResponse {
    /// First poster path across movie results, then TV results.
    ///
    /// Only the first entry of each array is consulted.
    pub(crate) fn first_poster_path(&self) -> Option<&str> {
        let movie = self
            .movie_results
            .first()
            .and_then(|m| m.poster_path.as_deref())
            .filter(|p| !p.is_empty());
        movie.or_else(|| {
            self.tv_results
                .first()
                .and_then(|t| t.poster_path.as_deref())
                .filter(|p| !p.is_empty())
        })
    }

    /// First movie result, else first TV result.
    pub(crate) fn into_first_details(self) -> Option<MediaDetails> {
        let FindResponse {
            movie_results,
            tv_results,
        } = self;
        movie_results
            .into_iter()
            .next()
            .map(MediaDetails::Movie)
            .or_else(|| tv_results.into_iter().next().map(MediaDetails::Tv))
    }
}

/// A movie result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: i64,
    pub adult: bool,
    pub backdrop_path: Option<String>,
    pub title: Option<String>,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    pub genre_ids: Vec<i64>,
    pub popularity: f64,
    pub release_date: Option<String>,
    pub video: bool,
    pub vote_average: f64,
    pub vote_count: i64,
}

/// A TV series result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TvDetails {
    pub id: i64,
    pub adult: bool,
    pub backdrop_path: Option<String>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    pub original_language: Option<String>,
    pub genre_ids: Vec<i64>,
    pub popularity: f64,
    pub first_air_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub origin_country: Vec<String>,
}

/// Details for one resolved identifier: either a movie or a TV series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MediaDetails {
    /// Resolved from `movie_results`.
    Movie(MovieDetails),
    /// Resolved from `tv_results`.
    Tv(TvDetails),
}

impl MediaDetails {
    /// TMDB numeric identifier.
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Movie(movie) => movie.id,
            Self::Tv(tv) => tv.id,
        }
    }

    /// Upstream poster path (relative to the poster base URL).
    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        match self {
            Self::Movie(movie) => movie.poster_path.as_deref(),
            Self::Tv(tv) => tv.poster_path.as_deref(),
        }
    }

    /// Display title: `title` for movies, `name` for series.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        match self {
            Self::Movie(movie) => movie.title.as_deref(),
            Self::Tv(tv) => tv.name.as_deref(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(body: &str) -> FindResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_first_poster_prefers_movie_results() {
        let response = parse(
            r#"{"movie_results":[{"id":1,"poster_path":"/m.jpg"}],"tv_results":[{"id":2,"poster_path":"/t.jpg"}]}"#,
        );
        assert_eq!(response.first_poster_path(), Some("/m.jpg"));
    }

    #[test]
    fn test_first_poster_falls_back_to_tv() {
        let response =
            parse(r#"{"movie_results":[],"tv_results":[{"id":2,"poster_path":"/t.jpg"}]}"#);
        assert_eq!(response.first_poster_path(), Some("/t.jpg"));
    }

    #[test]
    fn test_first_poster_skips_empty_movie_path() {
        let response = parse(
            r#"{"movie_results":[{"id":1,"poster_path":""}],"tv_results":[{"id":2,"poster_path":"/t.jpg"}]}"#,
        );
        assert_eq!(response.first_poster_path(), Some("/t.jpg"));
    }

    #[test]
    fn test_first_poster_none_when_missing() {
        assert_eq!(parse("{}").first_poster_path(), None);
        assert_eq!(
            parse(r#"{"movie_results":[{"id":1,"poster_path":null}]}"#).first_poster_path(),
            None
        );
    }

    #[test]
    fn test_into_first_details_variant() {
        let movie = parse(r#"{"movie_results":[{"id":10,"title":"Alien"}]}"#)
            .into_first_details()
            .unwrap();
        assert!(matches!(movie, MediaDetails::Movie(_)));
        assert_eq!(movie.id(), 10);
        assert_eq!(movie.display_title(), Some("Alien"));

        let tv = parse(r#"{"tv_results":[{"id":20,"name":"Chucky","poster_path":"/c.jpg"}]}"#)
            .into_first_details()
            .unwrap();
        assert!(matches!(tv, MediaDetails::Tv(_)));
        assert_eq!(tv.poster_path(), Some("/c.jpg"));
        assert_eq!(tv.display_title(), Some("Chucky"));

        assert!(parse("{}").into_first_details().is_none());
    }
}
