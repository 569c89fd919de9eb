//! Assertions for the htmx forms rendered by the page handlers.

use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid CSS selector")
}

fn find_input<'a>(form: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    form.select(&selector("input"))
        .find(|input| input.value().attr("name") == Some(name))
}

fn collected_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// The first form in the document. Panics if there is none.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form"))
        .next()
        .expect("Expected the page to contain a form")
}

/// Assert the form submits to `endpoint` via the given htmx attribute
/// (`hx-post`, `hx-put`, ...).
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    match form.value().attr(attribute) {
        Some(target) => assert_eq!(
            target, endpoint,
            "form submits {attribute} to {target:?}, expected {endpoint:?}"
        ),
        None => panic!("form has no {attribute} attribute"),
    }
}

#[track_caller]
fn assert_input(form: &ElementRef<'_>, name: &str, type_: &str, value: Option<&str>) {
    let input = find_input(form, name)
        .unwrap_or_else(|| panic!("form has no input named {name:?} (type {type_:?})"));

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "input {name:?} has type {got_type:?}, expected {type_:?}"
    );

    if let Some(value) = value {
        let got_value = input.value().attr("value").unwrap_or_default();
        assert_eq!(
            got_value, value,
            "input {name:?} holds {got_value:?}, expected {value:?}"
        );
    }

    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} is missing the required attribute"
    );
}

/// Assert the form has a required input with the given name and type.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    assert_input(form, name, type_, None);
}

/// Assert the form has a required input pre-filled with `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_input(form, name, type_, Some(value));
}

#[track_caller]
fn get_submit_button<'a>(form: &ElementRef<'a>) -> ElementRef<'a> {
    let button = form
        .select(&selector("button"))
        .next()
        .expect("form has no button");

    let got_type = button.value().attr("type").unwrap_or_default();
    assert_eq!(got_type, "submit", "form button has type {got_type:?}");

    button
}

/// Assert the form ends in a submit button.
#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    get_submit_button(form);
}

/// Assert the form's submit button carries the given label.
#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let got_text = collected_text(&get_submit_button(form));

    assert_eq!(got_text, text, "submit button reads {got_text:?}");
}

/// Assert the re-rendered form carries the given validation error message.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let paragraph = form
        .select(&selector("p"))
        .next()
        .expect("form has no error message paragraph");

    assert_eq!(collected_text(&paragraph), want_error_message);
}
