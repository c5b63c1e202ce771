use std::{fmt::Display, str::FromStr};

use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

pub fn relative_mouse_pos(event: &MouseEvent) -> (f64, f64) {
    (event.offset_x() as f64, event.offset_y() as f64)
}

/// `<option>`s for `values`, with `current` preselected.
pub fn options<T: Display + PartialEq>(
    values: impl IntoIterator<Item = T>,
    current: &T,
) -> Vec<Html> {
    values
        .into_iter()
        .map(|value| {
            html! {
                <option value={ value.to_string() } selected={ &value == current }>
                    { value.to_string() }
                </option>
            }
        })
        .collect()
}

pub fn select_get_value(event: Event) -> Option<String> {
    let target = event.target();
    let select = target.and_then(|target| target.dyn_into::<HtmlSelectElement>().ok());

    select.map(|select| select.value())
}

pub fn input_get_value(event: Event) -> Option<String> {
    let target = event.target();
    let input = target.and_then(|target| target.dyn_into::<HtmlInputElement>().ok());

    input.map(|input| input.value())
}

/// Parses the value of the `<select>` or `<input>` that fired `event`.
pub fn parse_event<T: FromStr>(event: Event) -> Option<T> {
    let value = match select_get_value(event.clone()) {
        Some(value) => Some(value),
        None => input_get_value(event),
    };

    value.and_then(|value| value.trim().parse().ok())
}
