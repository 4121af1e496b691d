use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{movie, user},
    flash::{Flash, Level},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn users_page(users: &[user::Model], flash: Option<&Flash>) -> String {
    page(
        "Filmshelf",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    (flash_banner(flash))

                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Filmshelf" }
                        p class="mt-2 text-gray-600" { "Pick a user to see their movies, or add a new one." }

                        form class="mt-8 flex gap-3" method="post" action="/users" {
                            input class="flex-1 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" name="name" id="name" placeholder="New user name" required;
                            button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Add user" }
                        }
                    }

                    @if users.is_empty() {
                        div class="mt-8 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No users yet." }
                        }
                    } @else {
                        ul class="mt-8 space-y-2" {
                            @for user in users {
                                li {
                                    a class="block bg-white shadow rounded-lg px-6 py-4 text-lg text-gray-900 hover:bg-gray-100" href=(format!("/users/{}/movies", user.id)) {
                                        (user.name)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn movies_page(user: &user::Model, movies: &[movie::Model], flash: Option<&Flash>) -> String {
    let add_action = format!("/users/{}/movies", user.id);

    page(
        &format!("{} · Filmshelf", user.name),
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    (flash_banner(flash))

                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { (user.name) "'s movies" }
                            p class="mt-2 text-gray-600" {
                                (movies.len()) @if movies.len() == 1 { " movie" } @else { " movies" }
                            }
                        }
                        a class="text-sm text-blue-600 hover:text-blue-800" href="/" { "All users" }
                    }

                    div class="mt-8 bg-white shadow rounded-lg p-6" {
                        h2 class="text-lg font-semibold text-gray-900" { "Add a movie" }
                        p class="mt-1 text-sm text-gray-500" { "Details are filled in from the movie database." }
                        form class="mt-4 flex flex-wrap gap-3" method="post" action=(add_action) {
                            input class="flex-1 min-w-48 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" name="title" placeholder="Title" required;
                            input class="w-28 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" name="year" placeholder="Year";
                            button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Add" }
                        }
                    }

                    @if movies.is_empty() {
                        div class="mt-8 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet. Add one above." }
                        }
                    } @else {
                        div class="mt-8 space-y-4" {
                            @for movie in movies {
                                (movie_card(user.id, movie))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Page not found" }
                        p class="mt-4 text-gray-700" { "Nothing lives at this address." }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back to the user list" }
                    }
                }
            }
        },
    )
}

fn flash_banner(flash: Option<&Flash>) -> Markup {
    let Some(flash) = flash else {
        return html! {};
    };
    let classes = match flash.level {
        Level::Success => {
            "mb-6 rounded-md border border-green-200 bg-green-50 px-4 py-3 text-green-800"
        },
        Level::Error => "mb-6 rounded-md border border-red-200 bg-red-50 px-4 py-3 text-red-800",
    };
    html! { div class=(classes) { (flash.message) } }
}

fn movie_card(user_id: i32, movie: &movie::Model) -> Markup {
    let update_action = format!("/users/{}/movies/{}/update", user_id, movie.id);
    let delete_action = format!("/users/{}/movies/{}/delete", user_id, movie.id);

    html! {
        div class="bg-white shadow rounded-lg p-6" {
            div class="flex items-start gap-5" {
                @if let Some(poster) = &movie.poster_url {
                    img class="w-20 rounded shadow" src=(poster) alt=(format!("{} poster", movie.title));
                }
                div class="flex-1" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    @if !movie.director.is_empty() {
                        p class="mt-1 text-sm text-gray-600" { "Directed by " (movie.director) }
                    }
                    p class="mt-1 text-sm text-gray-600" {
                        @if movie.rating > 0.0 {
                            "Rated " span class="font-medium" { (movie.rating) " / 10" }
                        } @else {
                            "Not rated yet"
                        }
                    }
                    @if let Some(notes) = &movie.notes {
                        p class="mt-2 text-sm text-gray-700 italic" { (notes) }
                    }

                    form class="mt-4 flex flex-wrap items-center gap-3" method="post" action=(update_action) {
                        input class="w-24 rounded-md border border-gray-300 px-2 py-1 text-sm" name="rating" type="number" min="1" max="10" step="0.1" placeholder="Rating";
                        input class="flex-1 min-w-48 rounded-md border border-gray-300 px-2 py-1 text-sm" name="notes" placeholder="Notes" value=[movie.notes.as_deref()];
                        button class="rounded-md bg-gray-800 px-3 py-1 text-sm font-semibold text-white hover:bg-gray-900" type="submit" { "Save" }
                    }
                }
                form method="post" action=(delete_action) {
                    button class="text-sm text-red-600 hover:text-red-800" type="submit" { "Delete" }
                }
            }
        }
    }
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}
