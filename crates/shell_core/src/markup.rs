use scraper::{Html, Selector};

use crate::{confetti::ParticleTrigger, copy::CopyButton};

#[derive(Debug, Default, Clone)]
pub(crate) struct FragmentBindings {
    pub(crate) copy_buttons: Vec<CopyButton>,
    pub(crate) particle_triggers: Vec<ParticleTrigger>,
}

/// One synchronous pass over a freshly installed fragment, collecting the
/// elements the behavior binder attaches to. Parser state stays local so
/// nothing non-Send crosses an await upstream.
pub(crate) fn scan_fragment(html: &str) -> FragmentBindings {
    let document = Html::parse_fragment(html);
    let copy_selector = Selector::parse("[data-copy]").expect("static selector");
    let trigger_selector = Selector::parse("[data-confetti]").expect("static selector");

    let copy_buttons = document
        .select(&copy_selector)
        .map(|element| {
            let payload = element.value().attr("data-copy").unwrap_or_default();
            CopyButton::new(payload.to_string())
        })
        .collect();

    let particle_triggers = document
        .select(&trigger_selector)
        .map(|_| ParticleTrigger::default())
        .collect();

    FragmentBindings {
        copy_buttons,
        particle_triggers,
    }
}
