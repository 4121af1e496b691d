use axum::{
    Router,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::SignedCookieJar;
use tracing::debug;

use crate::{
    AppState,
    entities::movie,
    error::{AppError, AppResult},
    flash::{self, Level},
    models::{AddMovieForm, CreateUserForm, LookupOutcome, NewMovie, UpdateMovieForm},
    templates,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/users", post(create_user))
        .route("/users/{user_id}/movies", get(user_movies).post(add_movie))
        .route("/users/{user_id}/movies/{movie_id}/update", post(update_movie))
        .route("/users/{user_id}/movies/{movie_id}/delete", post(delete_movie))
        .fallback(not_found)
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let (jar, flash) = flash::take(jar);
    let users = state.repo.list_users().await?;
    Ok((jar, Html(templates::users_page(&users, flash.as_ref()))).into_response())
}

async fn create_user(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Response> {
    let jar = match state.repo.create_user(&form.name).await {
        Ok(user) => flash::set(jar, Level::Success, format!("user '{}' added", user.name)),
        Err(err) => flash_failure(jar, err)?,
    };
    Ok((jar, Redirect::to("/")).into_response())
}

async fn user_movies(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i32>,
) -> AppResult<Response> {
    let (jar, flash) = flash::take(jar);

    let Some(user) = state.repo.get_user(user_id).await? else {
        let jar = flash::set(jar, Level::Error, format!("user {user_id} does not exist"));
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let movies = state.repo.list_movies(user.id).await?;
    Ok((jar, Html(templates::movies_page(&user, &movies, flash.as_ref()))).into_response())
}

async fn add_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i32>,
    Form(form): Form<AddMovieForm>,
) -> AppResult<Response> {
    let Some(user) = state.repo.get_user(user_id).await? else {
        let jar = flash::set(jar, Level::Error, format!("user {user_id} does not exist"));
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let back = format!("/users/{}/movies", user.id);

    let title = form.title.trim();
    if title.is_empty() {
        let jar = flash::set(jar, Level::Error, "movie title cannot be empty");
        return Ok((jar, Redirect::to(&back)).into_response());
    }
    let year = form.year.as_deref().map(str::trim).filter(|y| !y.is_empty());

    let jar = match state.lookup.lookup(title, year).await {
        Ok(LookupOutcome::Found(facts)) => {
            debug!(title = %facts.title, user_id = user.id, "adding movie from lookup");
            match state.repo.add_movie(NewMovie::from_facts(facts, user.id)).await {
                Ok(added) => flash::set(
                    jar,
                    Level::Success,
                    format!("added '{}' to {}'s movies", added.title, user.name),
                ),
                Err(err) => flash_failure(jar, err)?,
            }
        },
        Ok(LookupOutcome::NoMatch { title }) => {
            flash::set(jar, Level::Error, format!("no movie found matching '{title}'"))
        },
        Err(err) => flash_failure(jar, err)?,
    };

    Ok((jar, Redirect::to(&back)).into_response())
}

async fn update_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((user_id, movie_id)): Path<(i32, i32)>,
    Form(form): Form<UpdateMovieForm>,
) -> AppResult<Response> {
    let back = format!("/users/{user_id}/movies");

    let result = match scoped_movie(&state, user_id, movie_id).await {
        Ok(_) => {
            state.repo.update_movie(movie_id, form.rating.as_deref(), form.notes.as_deref()).await
        },
        Err(err) => Err(err),
    };

    let jar = match result {
        Ok(updated) => flash::set(
            jar,
            Level::Success,
            format!("updated '{}' (movie {})", updated.title, updated.id),
        ),
        Err(err) => flash_failure(jar, err)?,
    };
    Ok((jar, Redirect::to(&back)).into_response())
}

async fn delete_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((user_id, movie_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let back = format!("/users/{user_id}/movies");

    let result = match scoped_movie(&state, user_id, movie_id).await {
        Ok(target) => state.repo.delete_movie(movie_id).await.map(|()| target),
        Err(err) => Err(err),
    };

    let jar = match result {
        Ok(deleted) => flash::set(jar, Level::Success, format!("deleted '{}'", deleted.title)),
        Err(err) => flash_failure(jar, err)?,
    };
    Ok((jar, Redirect::to(&back)).into_response())
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(templates::not_found_page()))
}

/// The movie named in the URL, but only if it belongs to the user named in
/// the URL.
async fn scoped_movie(state: &AppState, user_id: i32, movie_id: i32) -> AppResult<movie::Model> {
    match state.repo.get_movie(movie_id).await? {
        Some(movie) if movie.user_id == user_id => Ok(movie),
        _ => Err(AppError::NotFound(format!("movie {movie_id} does not exist"))),
    }
}

/// Typed failures become a flash message on the redirect target; anything
/// unexpected propagates to the generic error page.
fn flash_failure(jar: SignedCookieJar, err: AppError) -> AppResult<SignedCookieJar> {
    if matches!(err, AppError::Unexpected(_)) {
        return Err(err);
    }
    if let AppError::UpstreamUnavailable(source) = &err {
        tracing::warn!(error = ?source, "metadata source unreachable");
    }
    Ok(flash::set(jar, Level::Error, err.user_message()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, header},
    };
    use axum_extra::extract::cookie::Key;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};
    use tower::ServiceExt;

    use super::*;
    use crate::{models::MovieFacts, omdb::MetadataLookup, repo::MovieRepository};

    struct FakeLookup(LookupOutcome);

    #[async_trait::async_trait]
    impl MetadataLookup for FakeLookup {
        async fn lookup(&self, _title: &str, _year: Option<&str>) -> AppResult<LookupOutcome> {
            Ok(self.0.clone())
        }
    }

    struct UnreachableLookup;

    #[async_trait::async_trait]
    impl MetadataLookup for UnreachableLookup {
        async fn lookup(&self, _title: &str, _year: Option<&str>) -> AppResult<LookupOutcome> {
            panic!("lookup must not be called");
        }
    }

    async fn app(lookup: Arc<dyn MetadataLookup>) -> (Router, MovieRepository) {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let repo = MovieRepository::new(db);
        let state = AppState { repo: repo.clone(), lookup, key: Key::generate() };
        (router(state), repo)
    }

    fn inception_facts() -> MovieFacts {
        MovieFacts {
            title: "Inception".to_string(),
            director: "Christopher Nolan".to_string(),
            year: "2010".to_string(),
            rating: 8.8,
            poster_url: Some("http://x/p.jpg".to_string()),
        }
    }

    fn form_post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn create_user_then_add_movie_then_list() {
        let (app, repo) =
            app(Arc::new(FakeLookup(LookupOutcome::Found(inception_facts())))).await;

        let resp = app.clone().oneshot(form_post("/users", "name=Bob")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");

        let bob = repo.list_users().await.unwrap().remove(0);
        let uri = format!("/users/{}/movies", bob.id);

        let resp =
            app.clone().oneshot(form_post(&uri, "title=inception&year=2010")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let movies = repo.list_movies(bob.id).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Inception");
        assert_eq!(movies[0].rating, 8.8);
        assert_eq!(movies[0].poster_url.as_deref(), Some("http://x/p.jpg"));
        assert_eq!(movies[0].notes, None);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/users/{}/movies", bob.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Inception"));
    }

    #[tokio::test]
    async fn unmatched_lookup_adds_nothing() {
        let (app, repo) = app(Arc::new(FakeLookup(LookupOutcome::NoMatch {
            title: "nope".to_string(),
        })))
        .await;

        let bob = repo.create_user("Bob").await.unwrap();
        let uri = format!("/users/{}/movies", bob.id);

        let resp = app.oneshot(form_post(&uri, "title=nope")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(repo.list_movies(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_title_never_reaches_the_lookup() {
        let (app, repo) = app(Arc::new(UnreachableLookup)).await;

        let bob = repo.create_user("Bob").await.unwrap();
        let uri = format!("/users/{}/movies", bob.id);

        let resp = app.oneshot(form_post(&uri, "title=%20%20")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(repo.list_movies(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_user_still_redirects_home() {
        let (app, repo) = app(Arc::new(UnreachableLookup)).await;
        repo.create_user("Alice").await.unwrap();

        let resp = app.oneshot(form_post("/users", "name=Alice")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_redirects_home() {
        let (app, _repo) = app(Arc::new(UnreachableLookup)).await;

        let resp = app
            .oneshot(Request::builder().uri("/users/999/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn movie_mutations_are_scoped_to_the_owning_user() {
        let (app, repo) =
            app(Arc::new(FakeLookup(LookupOutcome::Found(inception_facts())))).await;

        let bob = repo.create_user("Bob").await.unwrap();
        let eve = repo.create_user("Eve").await.unwrap();
        let movie = repo
            .add_movie(NewMovie::from_facts(inception_facts(), bob.id))
            .await
            .unwrap();

        // Eve's URL cannot delete Bob's movie.
        let uri = format!("/users/{}/movies/{}/delete", eve.id, movie.id);
        let resp = app.oneshot(form_post(&uri, "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(repo.list_movies(bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let (app, repo) = app(Arc::new(UnreachableLookup)).await;

        let bob = repo.create_user("Bob").await.unwrap();
        let movie = repo
            .add_movie(NewMovie::from_facts(inception_facts(), bob.id))
            .await
            .unwrap();

        let uri = format!("/users/{}/movies/{}/update", bob.id, movie.id);
        let resp = app.clone().oneshot(form_post(&uri, "rating=7&notes=rewatch")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let stored = repo.get_movie(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 7.0);
        assert_eq!(stored.notes.as_deref(), Some("rewatch"));

        let uri = format!("/users/{}/movies/{}/delete", bob.id, movie.id);
        let resp = app.clone().oneshot(form_post(&uri, "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(repo.list_movies(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unmatched_routes_render_the_404_page() {
        let (app, _repo) = app(Arc::new(UnreachableLookup)).await;

        let resp = app
            .oneshot(Request::builder().uri("/definitely/not/here").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
