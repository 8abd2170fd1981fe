//! Fixtures shaped like the edit forms of an operating-room tracker.
//!
//! Each `*_json` function returns the document as the server would send
//! it; the matching `Value` constructor adds the callbacks a live form
//! carries.

use changegate_core::{Callable, Mapping, Value};
use serde_json::json;

/// Case details as loaded from the server.
pub fn case_form_json() -> serde_json::Value {
    json!({
        "caseId": 5120,
        "procedure": "Laparoscopic cholecystectomy",
        "room": "OR-3",
        "status": "in_progress",
        "surgeon": { "id": 17, "name": "Dr. Okafor" },
        "staff": [
            { "id": 4, "name": "Ada", "role": "anesthesiologist" },
            { "id": 9, "name": "Lin", "role": "circulating nurse" }
        ],
        "timers": [timer_label_json("Anesthesia start", 0), timer_label_json("Incision", 1260)],
        "notes": null
    })
}

/// Live case form: the server document plus its save handler.
pub fn case_form() -> Value {
    let form = Value::from(case_form_json());
    if let Some(map) = form.as_mapping() {
        map.insert("onSave", Callable::named("saveCase", |_| Value::Undefined));
    }
    form
}

/// Comment editor contents.
pub fn comment_form() -> Value {
    Value::mapping([
        ("caseId", Value::from(5120)),
        ("comment", Value::from("Patient positioned supine.")),
        ("author", Value::mapping([("id", Value::from(9)), ("name", Value::from("Lin"))])),
        ("onSubmit", Value::from(Callable::named("postComment", |_| Value::Undefined))),
    ])
}

fn timer_label_json(label: &str, elapsed_seconds: u32) -> serde_json::Value {
    json!({ "label": label, "elapsedSeconds": elapsed_seconds, "running": false })
}

/// Timer label editor contents.
pub fn timer_label_form(label: &str, elapsed_seconds: u32) -> Value {
    Value::from(timer_label_json(label, elapsed_seconds))
}

/// Voice note editor contents. A note without a transcript has `Null` there.
pub fn voice_note_form(transcript: Option<&str>) -> Value {
    Value::mapping([
        ("title", Value::from("Closing summary")),
        ("uri", Value::from("file:///notes/5120-closing.m4a")),
        ("durationSeconds", Value::from(42)),
        ("transcript", transcript.map_or(Value::Null, Value::from)),
    ])
}

/// Two structurally identical, self-referential room records.
pub fn cyclic_pair() -> (Value, Value) {
    (cyclic_room("OR-3"), cyclic_room("OR-3"))
}

/// A room record whose `self` key points back at itself.
pub fn cyclic_room(name: &str) -> Value {
    let room = Mapping::from_entries([("name", Value::from(name)), ("beds", Value::from(1))]);
    room.insert("self", room.clone());
    Value::Mapping(room)
}
