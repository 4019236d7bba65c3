//! Dioxus web app for the folio portfolio site.
//!
//! Compiled to WASM. Every animated component builds a folio section on
//! mount, so the page honours `prefers-reduced-motion` live and a failing
//! animation leaves its section readable instead of blank.

mod motion;
mod sections;

use dioxus::prelude::*;

use crate::motion::Motion;
use crate::sections::{Hero, Projects, Stats};

fn main() {
    folio::web::init_logging(log::Level::Info);
    launch(app);
}

fn app() -> Element {
    let _ = use_context_provider(Motion::for_page);

    rsx! {
        main {
            Hero {
                title: "Hi, I build things for the web",
                tagline: "Systems, interfaces and the tooling in between",
            }
            Projects {
                projects: vec![
                    "Molecule viewer".to_owned(),
                    "Motion toolkit".to_owned(),
                    "Static site engine".to_owned(),
                ],
            }
            Stats {}
        }
    }
}
