use serde::Deserialize;

/// Normalized facts returned by a successful metadata lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieFacts {
    pub title: String,
    pub director: String,
    /// Verbatim from the source, e.g. "2010" or "2019–2022".
    pub year: String,
    /// 0.0 when the source reports no rating.
    pub rating: f64,
    pub poster_url: Option<String>,
}

/// Outcome of a title lookup. A miss is a regular outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    Found(MovieFacts),
    NoMatch { title: String },
}

/// Candidate movie row, fully populated before it reaches the repository.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub year: String,
    pub rating: f64,
    pub poster_url: Option<String>,
    pub user_id: i32,
}

impl NewMovie {
    pub fn from_facts(facts: MovieFacts, user_id: i32) -> Self {
        Self {
            title: facts.title,
            director: facts.director,
            year: facts.year,
            rating: facts.rating,
            poster_url: facts.poster_url,
            user_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMovieForm {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieForm {
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
