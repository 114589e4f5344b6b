use leptos::html::Img;
use leptos::prelude::*;

/// Tried in order; the logo disappears once every source has failed to load.
const LOGO_SOURCES: [&str; 3] = ["/Nexar - logo_black & red.png", "/nexar-logo.png", "/image.png"];

fn logo_source(index: usize) -> Option<&'static str> {
    LOGO_SOURCES.get(index).copied()
}

/// A finished load with no pixels is a failed one.
fn load_failed(complete: bool, natural_width: u32) -> bool {
    complete && natural_width == 0
}

#[component]
pub fn Logo() -> impl IntoView {
    let (source, set_source) = signal(0usize);
    let img_ref = NodeRef::<Img>::new();

    // The server-rendered image may fail before hydration attaches `on:error`,
    // and that event does not fire again.
    Effect::new(move |_| {
        if let Some(img) = img_ref.get() {
            if load_failed(img.complete(), img.natural_width()) {
                set_source.update(|i| *i += 1);
            }
        }
    });

    view! {
        <Show when=move || logo_source(source.get()).is_some()>
            <div class="logo">
                <img
                    node_ref=img_ref
                    src=move || logo_source(source.get()).unwrap_or_default()
                    alt="Nexar Logo"
                    on:error=move |_| set_source.update(|i| *i += 1)
                />
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_chain_ends() {
        assert_eq!(logo_source(0), Some("/Nexar - logo_black & red.png"));
        assert_eq!(logo_source(2), Some("/image.png"));
        assert_eq!(logo_source(3), None);
    }

    #[test]
    fn only_finished_empty_loads_fail() {
        assert!(load_failed(true, 0));
        assert!(!load_failed(false, 0));
        assert!(!load_failed(true, 240));
    }
}
