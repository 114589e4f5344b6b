use leptos::prelude::*;
use leptos::task::spawn_local;
#[cfg(feature = "hydrate")]
use leptos::web_sys;
use leptos_meta::Title;
use leptos_router::components::A;
use leptos_router::hooks::use_location;

use crate::components::{Logo, ResendForm, SessionVersion};
use crate::models::{confirm_email, ConfirmError, ConfirmParams, ConfirmState, ResendError};
use crate::server_fns::ServerProvider;

#[component]
pub fn AuthConfirmPage() -> impl IntoView {
    let location = use_location();
    let version = SessionVersion::current();
    let state = RwSignal::new(ConfirmState::Confirming);

    // Effects only run in the browser, which is the only place the fragment exists.
    Effect::new(move |_| {
        let params = ConfirmParams::from_url_parts(
            &location.hash.get_untracked(),
            &location.search.get_untracked(),
        );
        reset_viewport();
        spawn_local(async move {
            let result = confirm_email(&params, &ServerProvider).await;
            if result.is_ok() {
                version.bump();
            }
            state.set(result.into());
        });
    });

    view! {
        <Title text="Confirmare cont - Nexar"/>
        <div class="auth-page">
            <div class="auth-card">
                <Logo/>
                {move || match state.get() {
                    ConfirmState::Confirming => view! {
                        <div class="status">
                            <div class="spinner"></div>
                            <h2>"Se confirmă email-ul..."</h2>
                            <p>"Te rugăm să aștepți câteva momente."</p>
                        </div>
                    }.into_any(),
                    ConfirmState::Confirmed => view! {
                        <div class="success-message">
                            <h2>"Felicitări! Cont confirmat cu succes!"</h2>
                            <p>
                                "Bine ai venit în comunitatea Nexar! Contul tău a fost confirmat cu succes. "
                                "Te poți bucura acum de toate funcționalitățile platformei."
                            </p>
                            <ExitLinks sign_in_label="Conectează-te"/>
                        </div>
                    }.into_any(),
                    ConfirmState::Failed(err) => view! {
                        <FailedConfirmation error=err state/>
                    }.into_any(),
                    ConfirmState::NewLinkSent => view! {
                        <div class="success-message">
                            <h2>"Link nou trimis!"</h2>
                            <p>
                                "Ți-am trimis un nou email de confirmare. "
                                "Verifică-ți căsuța de email, inclusiv folderul spam."
                            </p>
                            <ExitLinks sign_in_label="Conectează-te"/>
                        </div>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
fn FailedConfirmation(error: ConfirmError, state: RwSignal<ConfirmState>) -> impl IntoView {
    let offers_resend = error.offers_resend();

    // Only a state change re-renders the page; a failed resend stays in the form.
    let on_result = move |result: Result<(), ResendError>| {
        let current = state.get_untracked();
        let next = current.clone().after_resend(&result);
        if next != current {
            state.set(next);
        }
    };

    view! {
        <div class="error-message">
            <h2>"Eroare la confirmarea contului"</h2>
            <p>{error.to_string()}</p>

            <Show when=move || offers_resend>
                <ResendForm on_result/>
            </Show>

            <ExitLinks sign_in_label="Încearcă să te conectezi"/>
        </div>
    }
}

#[component]
fn ExitLinks(sign_in_label: &'static str) -> impl IntoView {
    view! {
        <div class="cta-buttons">
            <A href="/auth" attr:class="btn btn-primary">{sign_in_label}</A>
            <A href="/" attr:class="btn btn-secondary">"Pagina Principală"</A>
        </div>
    }
}

/// Scroll to the top and drop the fragment so session tokens don't stay in
/// the address bar or history.
fn reset_viewport() {
    #[cfg(feature = "hydrate")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        window.scroll_to_with_x_and_y(0.0, 0.0);

        let location = window.location();
        if location.hash().map(|h| h.is_empty()).unwrap_or(true) {
            return;
        }
        if let (Ok(path), Ok(search), Ok(history)) =
            (location.pathname(), location.search(), window.history())
        {
            let _ = history.replace_state_with_url(
                &wasm_bindgen::JsValue::NULL,
                "",
                Some(&format!("{path}{search}")),
            );
        }
    }
}
