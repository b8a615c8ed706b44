use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use shared::{
    trip::{self, Meridiem},
    ApiError, Coordinate, KeyCheckRequest, KeyCheckResponse, LocationCandidate, RoutePlan,
    RouteQuery, RouteSummary, SuggestRequest, TravelMode,
};
use wasm_bindgen::prelude::{wasm_bindgen, JsValue};

#[wasm_bindgen(module = "/route_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map();
    #[wasm_bindgen(js_name = updateRoute)]
    fn update_route_js(legs: JsValue);
    #[wasm_bindgen(js_name = updateMarkers)]
    fn update_markers(origin: JsValue, destination: JsValue);
    #[wasm_bindgen(js_name = centerMap)]
    fn center_map(origin: JsValue);
    #[wasm_bindgen(js_name = clearRoute)]
    fn clear_route();
}

const DEBOUNCE_MS: u32 = 300;

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:8080/api".to_string()
}

pub struct Model {
    /// Validated API key; `None` keeps the key gate on screen.
    session_key: Option<String>,
    key_form: KeyForm,
    mode: TravelMode,
    origin: SearchField,
    destination: SearchField,
    departure: DeparturePicker,
    /// Departure string sent with the in-flight route request.
    last_departure: Option<String>,
    pending: bool,
    trip: Option<TripSummary>,
    notice: Option<String>,
    error: Option<String>,
}

#[derive(Default)]
struct KeyForm {
    input: String,
    pending: bool,
    error: Option<String>,
}

/// One typeahead search box. `generation` grows on every keystroke so
/// debounce timers and stale responses can be ignored.
#[derive(Default)]
struct SearchField {
    query: String,
    suggestions: Vec<LocationCandidate>,
    chosen: Option<LocationCandidate>,
    generation: u32,
}

impl SearchField {
    fn edit(&mut self, query: String) -> u32 {
        self.query = query;
        self.chosen = None;
        self.generation += 1;
        if self.query.trim().is_empty() {
            self.suggestions.clear();
        }
        self.generation
    }

    /// Accepts a suggestion list only when it answers the latest keystroke.
    fn apply_suggestions(&mut self, generation: u32, suggestions: Vec<LocationCandidate>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.suggestions = suggestions;
        true
    }

    fn pick(&mut self, index: usize) -> bool {
        let Some(candidate) = self.suggestions.get(index).cloned() else {
            return false;
        };
        self.query = candidate.label.clone();
        self.chosen = Some(candidate);
        self.suggestions.clear();
        true
    }
}

#[derive(Clone)]
struct DeparturePicker {
    date: String,
    hour: u32,
    minute: u32,
    meridiem: Meridiem,
}

impl DeparturePicker {
    fn to_iso(&self) -> Option<String> {
        trip::departure_iso(&self.date, self.hour, self.minute, self.meridiem)
    }
}

struct TripSummary {
    distance: String,
    travel_time: String,
    departure: String,
    arrival: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slot {
    Origin,
    Destination,
}

impl Model {
    fn search_field(&self, slot: Slot) -> &SearchField {
        match slot {
            Slot::Origin => &self.origin,
            Slot::Destination => &self.destination,
        }
    }

    fn search_field_mut(&mut self, slot: Slot) -> &mut SearchField {
        match slot {
            Slot::Origin => &mut self.origin,
            Slot::Destination => &mut self.destination,
        }
    }
}

pub enum Msg {
    KeyInputChanged(String),
    SubmitKey,
    KeyChecked(Result<KeyCheckResponse, String>),
    ModeChanged(TravelMode),
    QueryChanged(Slot, String),
    QueryDebounced(Slot, u32),
    SuggestionsFetched(Slot, u32, Result<Vec<LocationCandidate>, String>),
    SuggestionPicked(Slot, usize),
    DateChanged(String),
    HourChanged(String),
    MinuteChanged(String),
    MeridiemChanged(Meridiem),
    FindRoute,
    RouteFetched(Result<RoutePlan, String>),
}

pub fn init(_: Url, _: &mut impl Orders<Msg>) -> Model {
    Model {
        session_key: None,
        key_form: KeyForm::default(),
        mode: TravelMode::Car,
        origin: SearchField::default(),
        destination: SearchField::default(),
        departure: departure_now(),
        last_departure: None,
        pending: false,
        trip: None,
        notice: None,
        error: None,
    }
}

fn departure_now() -> DeparturePicker {
    let now = js_sys::Date::new_0();
    let hour24 = now.get_hours();
    DeparturePicker {
        date: format!(
            "{:04}-{:02}-{:02}",
            now.get_full_year(),
            now.get_month() + 1,
            now.get_date()
        ),
        hour: match hour24 % 12 {
            0 => 12,
            hour => hour,
        },
        minute: now.get_minutes(),
        meridiem: if hour24 >= 12 { Meridiem::Pm } else { Meridiem::Am },
    }
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::KeyInputChanged(value) => {
            model.key_form.input = value;
        }
        Msg::SubmitKey => {
            if model.key_form.pending {
                return;
            }
            if model.key_form.input.trim().is_empty() {
                model.key_form.error = Some("Please enter your API key.".to_string());
                return;
            }
            model.key_form.pending = true;
            model.key_form.error = None;
            let key = model.key_form.input.trim().to_string();
            orders.perform_cmd(check_key(key));
        }
        Msg::KeyChecked(result) => {
            model.key_form.pending = false;
            match result {
                Ok(check) if check.valid => {
                    model.session_key = Some(model.key_form.input.trim().to_string());
                    model.key_form.error = None;
                }
                Ok(check) => {
                    model.key_form.error = Some(
                        check
                            .message
                            .unwrap_or_else(|| "Please enter a valid API key.".to_string()),
                    );
                }
                Err(err) => {
                    model.key_form.error = Some(err);
                }
            }
        }
        Msg::ModeChanged(mode) => {
            model.mode = mode;
        }
        Msg::QueryChanged(slot, value) => {
            let generation = model.search_field_mut(slot).edit(value);
            if !model.search_field(slot).query.trim().is_empty() {
                orders.perform_cmd(cmds::timeout(DEBOUNCE_MS, move || {
                    Msg::QueryDebounced(slot, generation)
                }));
            }
        }
        Msg::QueryDebounced(slot, generation) => {
            let Some(key) = model.session_key.clone() else {
                return;
            };
            let field = model.search_field(slot);
            if generation != field.generation || field.query.trim().is_empty() {
                return;
            }
            let query = field.query.clone();
            orders.perform_cmd(fetch_suggestions(key, slot, generation, query));
        }
        Msg::SuggestionsFetched(slot, generation, result) => match result {
            Ok(suggestions) => {
                model
                    .search_field_mut(slot)
                    .apply_suggestions(generation, suggestions);
            }
            Err(err) => {
                let field = model.search_field_mut(slot);
                if generation == field.generation {
                    field.suggestions.clear();
                    model.error = Some(err);
                }
            }
        },
        Msg::SuggestionPicked(slot, index) => {
            model.search_field_mut(slot).pick(index);
        }
        Msg::DateChanged(value) => {
            model.departure.date = value;
        }
        Msg::HourChanged(value) => {
            if let Ok(hour) = value.parse::<u32>() {
                model.departure.hour = hour;
            }
        }
        Msg::MinuteChanged(value) => {
            if let Ok(minute) = value.parse::<u32>() {
                model.departure.minute = minute;
            }
        }
        Msg::MeridiemChanged(meridiem) => {
            model.departure.meridiem = meridiem;
        }
        Msg::FindRoute => {
            if model.pending {
                return;
            }
            model.notice = None;
            model.error = None;

            let Some(key) = model.session_key.clone() else {
                return;
            };
            let (Some(origin), Some(destination)) =
                (model.origin.chosen.clone(), model.destination.chosen.clone())
            else {
                model.error = Some(
                    "Please select both an origin and a destination before finding the fastest route."
                        .to_string(),
                );
                return;
            };
            let Some(depart_at) = model.departure.to_iso() else {
                model.error = Some("Please choose a valid departure date and time.".to_string());
                return;
            };

            let payload = RouteQuery {
                key,
                origin: origin.position,
                destination: destination.position,
                mode: model.mode,
                depart_at: Some(depart_at.clone()),
            };
            model.last_departure = Some(depart_at);
            model.pending = true;
            orders.perform_cmd(send_route_query(payload));
        }
        Msg::RouteFetched(result) => {
            model.pending = false;
            match result {
                Ok(plan) => {
                    let depart_at = model.last_departure.clone().unwrap_or_default();
                    match trip_summary(plan.summary, &depart_at) {
                        Ok(summary) => {
                            model.trip = Some(summary);
                            model.error = None;
                            model.notice = Some("Route data retrieved successfully!".to_string());
                            if let (Some(origin), Some(destination)) =
                                (&model.origin.chosen, &model.destination.chosen)
                            {
                                draw_route(&plan, origin, destination);
                            }
                        }
                        Err(err) => {
                            model.trip = None;
                            clear_route();
                            model.error = Some(err);
                        }
                    }
                }
                Err(err) => {
                    model.trip = None;
                    clear_route();
                    model.error = Some(err);
                }
            }
        }
    }
}

/// Distance, travel time, and departure/arrival labels for one decoded route.
fn trip_summary(summary: RouteSummary, depart_at: &str) -> Result<TripSummary, String> {
    let (departure, arrival) = trip::trip_times(depart_at, summary.travel_time_in_seconds)
        .ok_or_else(|| {
            format!("An error occurred while calculating arrival time from \"{depart_at}\".")
        })?;
    Ok(TripSummary {
        distance: trip::format_distance(summary.length_in_meters),
        travel_time: trip::format_travel_time(summary.travel_time_in_seconds),
        departure,
        arrival,
    })
}

#[derive(Serialize)]
struct MarkerPin {
    lat: f64,
    lon: f64,
    label: String,
}

fn marker_pin(candidate: &LocationCandidate) -> MarkerPin {
    MarkerPin {
        lat: candidate.position.lat,
        lon: candidate.position.lon,
        label: candidate.label.clone(),
    }
}

fn draw_route(plan: &RoutePlan, origin: &LocationCandidate, destination: &LocationCandidate) {
    let legs: Vec<Vec<Coordinate>> = plan.legs.iter().map(|leg| leg.points.clone()).collect();
    if let Ok(value) = to_value(&legs) {
        update_route_js(value);
    }
    if let (Ok(origin_js), Ok(destination_js)) =
        (to_value(&marker_pin(origin)), to_value(&marker_pin(destination)))
    {
        update_markers(origin_js.clone(), destination_js);
        center_map(origin_js);
    }
}

async fn check_key(key: String) -> Msg {
    let payload = KeyCheckRequest { key };
    let result = match Request::new(format!("{}/key", api_root()))
        .method(Method::Post)
        .json(&payload)
    {
        Err(err) => Err(format!("{err:?}")),
        Ok(request) => match request.fetch().await {
            Err(err) => Err(format!("{err:?}")),
            Ok(raw) => match raw.check_status() {
                Err(status_err) => Err(format!("{status_err:?}")),
                Ok(resp) => match resp.json::<KeyCheckResponse>().await {
                    Ok(check) => Ok(check),
                    Err(err) => Err(format!("{err:?}")),
                },
            },
        },
    };
    Msg::KeyChecked(result)
}

async fn fetch_suggestions(key: String, slot: Slot, generation: u32, query: String) -> Msg {
    let payload = SuggestRequest { key, query };
    let result = match Request::new(format!("{}/suggest", api_root()))
        .method(Method::Post)
        .json(&payload)
    {
        Err(err) => Err(format!("{err:?}")),
        Ok(request) => match request.fetch().await {
            Err(err) => Err(format!("{err:?}")),
            Ok(raw) => match raw.check_status() {
                Err(status_err) => Err(format!("{status_err:?}")),
                Ok(resp) => match resp.json::<Vec<LocationCandidate>>().await {
                    Ok(candidates) => Ok(candidates),
                    Err(err) => Err(format!("{err:?}")),
                },
            },
        },
    };
    Msg::SuggestionsFetched(slot, generation, result)
}

async fn send_route_query(payload: RouteQuery) -> Msg {
    let result = match Request::new(format!("{}/route", api_root()))
        .method(Method::Post)
        .json(&payload)
    {
        Err(err) => Err(format!("{err:?}")),
        Ok(request) => match request.fetch().await {
            Err(err) => Err(format!("{err:?}")),
            Ok(raw) => {
                let status = raw.status();
                if (200u16..300u16).contains(&status.code) {
                    match raw.json::<RoutePlan>().await {
                        Ok(plan) => Ok(plan),
                        Err(err) => Err(format!("{err:?}")),
                    }
                } else {
                    // The backend answers failures with a JSON message.
                    match raw.json::<ApiError>().await {
                        Ok(api_error) => Err(api_error.message),
                        Err(_) => Err(format!("Route request failed ({}).", status.code)),
                    }
                }
            }
        },
    };
    Msg::RouteFetched(result)
}

pub fn view(model: &Model) -> Node<Msg> {
    let header = h1!["Travel Time Estimator"];
    let content = if model.session_key.is_some() {
        view_main(model)
    } else {
        view_key_gate(model)
    };
    div![C!["app-container"], header, content]
}

fn view_key_gate(model: &Model) -> Node<Msg> {
    div![
        C!["key-gate"],
        h2!["Enter Your API Key:"],
        input![
            attrs! {
                At::Type => "password",
                At::Value => model.key_form.input.as_str(),
                At::Placeholder => "API Key",
                At::AutoComplete => "off",
            },
            input_ev(Ev::Input, Msg::KeyInputChanged),
        ],
        button![
            "Submit",
            attrs! { At::Disabled => bool_attr(model.key_form.pending) },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::SubmitKey
            }),
        ],
        if let Some(error) = &model.key_form.error {
            p![C!["error"], error]
        } else {
            empty![]
        },
    ]
}

fn view_main(model: &Model) -> Node<Msg> {
    div![
        C!["planner"],
        view_mode_selector(model),
        view_search_field(model, Slot::Origin, "Search for origin location..."),
        view_search_field(model, Slot::Destination, "Search for destination location..."),
        view_departure_picker(model),
        button![
            "Find Fastest Route",
            C!["find-route"],
            attrs! { At::Disabled => bool_attr(model.pending) },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::FindRoute
            }),
        ],
        if let Some(notice) = &model.notice {
            p![C!["notice"], notice]
        } else {
            empty![]
        },
        if let Some(error) = &model.error {
            p![C!["error"], error]
        } else {
            empty![]
        },
        view_trip(model),
    ]
}

fn view_mode_selector(model: &Model) -> Node<Msg> {
    fieldset![
        legend!["Select Travel Mode:"],
        div![
            C!["mode-row"],
            TravelMode::ALL.iter().map(|&mode| {
                label![
                    C!["mode-option"],
                    input![
                        attrs! {
                            At::Type => "radio",
                            At::Name => "travel-mode",
                            At::Checked => bool_attr(model.mode == mode),
                        },
                        ev(Ev::Change, move |_| Msg::ModeChanged(mode)),
                    ],
                    span![mode.label()],
                ]
            }),
        ],
    ]
}

fn view_search_field(model: &Model, slot: Slot, placeholder: &str) -> Node<Msg> {
    let field = model.search_field(slot);
    let legend_text = match slot {
        Slot::Origin => "Origin",
        Slot::Destination => "Destination",
    };

    fieldset![
        legend![legend_text],
        input![
            attrs! {
                At::Value => field.query.as_str(),
                At::Placeholder => placeholder,
                At::AutoComplete => "off",
                At::SpellCheck => "false",
            },
            input_ev(Ev::Input, move |value| Msg::QueryChanged(slot, value)),
        ],
        if field.suggestions.is_empty() {
            empty![]
        } else {
            ul![
                C!["suggestions"],
                field.suggestions.iter().enumerate().map(|(index, candidate)| {
                    li![
                        candidate.label.clone(),
                        ev(Ev::Click, move |_| Msg::SuggestionPicked(slot, index)),
                    ]
                }),
            ]
        },
        if let Some(chosen) = &field.chosen {
            small![format!(
                "{} ({:.5}, {:.5})",
                chosen.label, chosen.position.lat, chosen.position.lon
            )]
        } else {
            empty![]
        },
    ]
}

fn view_departure_picker(model: &Model) -> Node<Msg> {
    let picker = &model.departure;

    fieldset![
        legend!["Select Departure Date & Time"],
        div![
            C!["departure-row"],
            input![
                attrs! {
                    At::Type => "date",
                    At::Value => picker.date.as_str(),
                },
                input_ev(Ev::Input, Msg::DateChanged),
            ],
            select![
                attrs! { At::Name => "hour" },
                (1..=12u32).map(|hour| {
                    let value = hour.to_string();
                    option![
                        attrs! {
                            At::Value => value.as_str(),
                            At::Selected => bool_attr(picker.hour == hour),
                        },
                        value.clone(),
                    ]
                }),
                input_ev(Ev::Change, Msg::HourChanged),
            ],
            select![
                attrs! { At::Name => "minute" },
                (0..60u32).map(|minute| {
                    let value = minute.to_string();
                    option![
                        attrs! {
                            At::Value => value.as_str(),
                            At::Selected => bool_attr(picker.minute == minute),
                        },
                        format!("{minute:02}"),
                    ]
                }),
                input_ev(Ev::Change, Msg::MinuteChanged),
            ],
            div![
                C!["meridiem"],
                label![
                    input![
                        attrs! {
                            At::Type => "radio",
                            At::Name => "meridiem",
                            At::Checked => bool_attr(picker.meridiem == Meridiem::Am),
                        },
                        ev(Ev::Change, |_| Msg::MeridiemChanged(Meridiem::Am)),
                    ],
                    span!["AM"],
                ],
                label![
                    input![
                        attrs! {
                            At::Type => "radio",
                            At::Name => "meridiem",
                            At::Checked => bool_attr(picker.meridiem == Meridiem::Pm),
                        },
                        ev(Ev::Change, |_| Msg::MeridiemChanged(Meridiem::Pm)),
                    ],
                    span!["PM"],
                ],
            ],
        ],
    ]
}

fn view_trip(model: &Model) -> Node<Msg> {
    if let Some(trip) = &model.trip {
        let card = |label: &str, content: &str| {
            div![
                C!["trip-card"],
                span![C!["label"], label],
                strong![content],
            ]
        };

        div![
            C!["trip-details"],
            h2!["Route Details:"],
            div![
                C!["trip-grid"],
                card("Distance", &trip.distance),
                card("Travel Time", &trip.travel_time),
                card("Departure Time", &trip.departure),
                card("Expected Arrival Time", &trip.arrival),
            ],
        ]
    } else {
        div![
            C!["trip-details"],
            h2!["Route Details:"],
            p!["Search for a route to see distance, travel time, and arrival."],
        ]
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    init_map();
    App::start("app", init, update, view);
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, lat: f64, lon: f64) -> LocationCandidate {
        LocationCandidate {
            label: label.to_string(),
            position: Coordinate { lat, lon },
        }
    }

    #[test]
    fn picker_builds_iso_departure() {
        let picker = DeparturePicker {
            date: "2024-01-01".to_string(),
            hour: 9,
            minute: 0,
            meridiem: Meridiem::Am,
        };
        assert_eq!(picker.to_iso().as_deref(), Some("2024-01-01T09:00:00"));
    }

    #[test]
    fn picker_handles_noon_and_midnight() {
        let noon = DeparturePicker {
            date: "2024-01-01".to_string(),
            hour: 12,
            minute: 15,
            meridiem: Meridiem::Pm,
        };
        assert_eq!(noon.to_iso().as_deref(), Some("2024-01-01T12:15:00"));

        let midnight = DeparturePicker {
            date: "2024-01-01".to_string(),
            hour: 12,
            minute: 5,
            meridiem: Meridiem::Am,
        };
        assert_eq!(midnight.to_iso().as_deref(), Some("2024-01-01T00:05:00"));
    }

    #[test]
    fn picker_rejects_bad_date() {
        let picker = DeparturePicker {
            date: "someday".to_string(),
            hour: 9,
            minute: 0,
            meridiem: Meridiem::Am,
        };
        assert_eq!(picker.to_iso(), None);
    }

    #[test]
    fn trip_summary_formats_route_details() {
        let summary = RouteSummary {
            length_in_meters: 10_000,
            travel_time_in_seconds: 1_200,
        };
        let trip = trip_summary(summary, "2024-01-01T09:00:00").unwrap();
        assert_eq!(trip.distance, "10.00 km");
        assert_eq!(trip.travel_time, "20.00 minutes");
        assert_eq!(trip.departure, "2024-01-01 09:00 AM");
        assert_eq!(trip.arrival, "2024-01-01 09:20 AM");
    }

    #[test]
    fn trip_summary_surfaces_bad_departure() {
        let summary = RouteSummary {
            length_in_meters: 1_000,
            travel_time_in_seconds: 60,
        };
        assert!(trip_summary(summary, "not-a-timestamp").is_err());
    }

    #[test]
    fn editing_a_field_invalidates_earlier_lookups() {
        let mut field = SearchField::default();
        let first = field.edit("que".to_string());
        let second = field.edit("queen".to_string());
        assert!(second > first);

        // The answer to the earlier keystroke arrives late and is dropped.
        assert!(!field.apply_suggestions(first, vec![candidate("stale", 0.0, 0.0)]));
        assert!(field.suggestions.is_empty());

        assert!(field.apply_suggestions(second, vec![candidate("fresh", -36.8, 174.7)]));
        assert_eq!(field.suggestions[0].label, "fresh");
    }

    #[test]
    fn clearing_a_field_drops_suggestions() {
        let mut field = SearchField::default();
        let generation = field.edit("queen".to_string());
        field.apply_suggestions(generation, vec![candidate("somewhere", -36.8, 174.7)]);
        assert_eq!(field.suggestions.len(), 1);

        field.edit("   ".to_string());
        assert!(field.suggestions.is_empty());
    }

    #[test]
    fn picking_a_suggestion_fixes_the_candidate() {
        let mut field = SearchField::default();
        let generation = field.edit("queen".to_string());
        field.apply_suggestions(
            generation,
            vec![
                candidate("1 Queen Street, Auckland", -36.8443, 174.7673),
                candidate("Queenstown Airport", -45.0210, 168.7392),
            ],
        );

        assert!(field.pick(1));
        assert_eq!(field.query, "Queenstown Airport");
        assert_eq!(field.chosen.as_ref().unwrap().position.lat, -45.0210);
        assert!(field.suggestions.is_empty());
    }

    #[test]
    fn picking_out_of_range_is_a_no_op() {
        let mut field = SearchField::default();
        assert!(!field.pick(3));
        assert!(field.chosen.is_none());
    }
}
