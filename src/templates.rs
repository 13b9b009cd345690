use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    csrf,
    forms::{EditForm, FormErrors, MAX_REVIEW_LEN, SearchForm},
    models::Movie,
    tmdb::SearchResult,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[Movie]) -> String {
    page(
        "My Top Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet. Add one to get started." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for movie in movies {
                                (movie_card(movie))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(movie: &Movie, form: &EditForm, errors: &FormErrors, csrf_token: &str) -> String {
    page(
        "Edit Movie",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { (movie.title) }
                p class="mt-2 text-gray-600" {
                    @if movie.rating > 0.0 {
                        "Currently rated " (format_rating(movie.rating)) "/10."
                    } @else {
                        "Not rated yet."
                    }
                }

                form class="mt-8 space-y-6" method="post" action=(format!("/edit/{}", movie.id)) {
                    (form_errors(errors))
                    input type="hidden" name=(csrf::COOKIE_NAME) value=(csrf_token);

                    div {
                        label class="block text-sm font-medium text-gray-700" for="rating" { "Your rating out of 10, eg.: 7.4" }
                        input class=(INPUT_CLASS) name="rating" id="rating" inputmode="decimal" value=(form.rating) required;
                        (field_errors(errors, "rating"))
                    }

                    div {
                        label class="block text-sm font-medium text-gray-700" for="review" { "Your review" }
                        textarea class=(INPUT_CLASS) name="review" id="review" rows="3" maxlength=(MAX_REVIEW_LEN) required { (form.review) }
                        (field_errors(errors, "review"))
                    }

                    button class=(BUTTON_CLASS) type="submit" { "Done" }
                }
            }))
        },
    )
}

pub fn add_page(form: &SearchForm, errors: &FormErrors, csrf_token: &str) -> String {
    page(
        "Add Movie",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Add a Movie" }

                form class="mt-8 space-y-6" method="post" action="/add" {
                    (form_errors(errors))
                    input type="hidden" name=(csrf::COOKIE_NAME) value=(csrf_token);

                    div {
                        label class="block text-sm font-medium text-gray-700" for="title" { "Movie title" }
                        input class=(INPUT_CLASS) name="title" id="title" value=(form.title) required;
                        (field_errors(errors, "title"))
                    }

                    button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
                }
            }))
        },
    )
}

pub fn select_page(query: &str, results: &[SearchResult]) -> String {
    page(
        "Select Movie",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Select a movie" }
                p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }

                @if results.is_empty() {
                    p class="mt-6 text-gray-600" { "No movies matched. Try another title." }
                } @else {
                    ul class="mt-6 divide-y divide-gray-200" {
                        @for result in results {
                            li class="py-3" {
                                a class="text-blue-600 hover:text-blue-800" href=(format!("/select/{}", result.id)) {
                                    (result.display_title())
                                    @if let Some(year) = result.release_year() {
                                        span class="ml-2 text-gray-500" { "(" (year) ")" }
                                    }
                                }
                            }
                        }
                    }
                }
                a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "New search" }
            }))
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        html! {
            (card(html! {
                h1 class="text-2xl font-bold text-gray-900" {
                    (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error"))
                }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }))
        },
    )
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

fn card(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50 flex items-center justify-center" {
            div class="max-w-xl w-full px-6" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" data-movie-id=(movie.id) {
            img class="w-24 h-36 rounded object-cover" src=(movie.img_url) alt=(movie.title);
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(ranking) = movie.ranking {
                            span class="mr-2 text-gray-400" { "#" (ranking) }
                        }
                        (movie.title)
                        @if let Some(year) = movie.year {
                            span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                        }
                    }
                    span class="text-lg font-semibold text-yellow-600" { (format_rating(movie.rating)) }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-700" { "\u{201c}" (review) "\u{201d}" }
                }
                p class="mt-2 text-sm text-gray-600" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit/{}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete/{}", movie.id)) { "Delete" }
                }
            }
        }
    }
}

fn form_errors(errors: &FormErrors) -> Markup {
    html! {
        @for message in errors.form() {
            p class="rounded-md bg-red-50 px-3 py-2 text-sm text-red-700" { (message) }
        }
    }
}

fn field_errors(errors: &FormErrors, field: &str) -> Markup {
    html! {
        @for message in errors.field(field) {
            p class="mt-1 text-sm text-red-600" { (message) }
        }
    }
}

fn format_rating(rating: f64) -> String {
    // 7.0 -> "7", 7.45 -> "7.45"
    let s = format!("{rating:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Movie {
        Movie {
            id: 4,
            title: "Spirited <Away>".into(),
            year: Some(2001),
            description: "A girl in a spirit world.".into(),
            rating: 9.0,
            ranking: Some(1),
            review: Some("Magical".into()),
            img_url: "https://image.tmdb.org/t/p/original/sa.jpg".into(),
        }
    }

    #[test]
    fn index_lists_movies_with_links() {
        let html = index_page(&[movie()]);
        assert!(html.contains("Spirited &lt;Away&gt;"));
        assert!(html.contains("href=\"/edit/4\""));
        assert!(html.contains("href=\"/delete/4\""));
        assert!(html.contains("#1"));
    }

    #[test]
    fn empty_index_says_so() {
        assert!(index_page(&[]).contains("No movies yet"));
    }

    #[test]
    fn edit_page_carries_token_and_errors() {
        let mut errors = FormErrors::default();
        errors.add("rating", "Rating must be a number, e.g. 7.4.");
        let html = edit_page(&movie(), &EditForm::default(), &errors, "tok123");
        assert!(html.contains("name=\"csrf_token\" value=\"tok123\""));
        assert!(html.contains("Rating must be a number"));
        assert!(html.contains("action=\"/edit/4\""));
    }

    #[test]
    fn select_page_links_to_results() {
        let result = SearchResult {
            id: 129,
            original_title: Some("千と千尋の神隠し".into()),
            title: None,
            release_date: Some("2001-07-20".into()),
            overview: None,
            poster_path: None,
        };
        let html = select_page("spirited", &[result]);
        assert!(html.contains("href=\"/select/129\""));
        assert!(html.contains("(2001)"));
        assert!(select_page("zzz", &[]).contains("No movies matched"));
    }

    #[test]
    fn ratings_drop_trailing_zeros() {
        assert_eq!(format_rating(7.0), "7");
        assert_eq!(format_rating(7.4), "7.4");
        assert_eq!(format_rating(0.0), "0");
    }
}
