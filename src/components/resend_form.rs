use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::models::{request_new_link, ResendError};
use crate::server_fns::ServerProvider;

/// Asks the provider to send a fresh confirmation email. Validation and
/// provider errors are shown inline; every finished attempt is reported
/// through `on_result`.
#[component]
pub fn ResendForm(
    #[prop(optional, into)] email: String,
    #[prop(into)] on_result: Callback<Result<(), ResendError>>,
) -> impl IntoView {
    let (email, set_email) = signal(email);
    let (error, set_error) = signal(None::<ResendError>);

    let resend_action = Action::new_local(|email: &String| {
        let email = email.clone();
        async move { request_new_link(&email, &ServerProvider).await }
    });

    Effect::new(move |_| {
        if let Some(result) = resend_action.value().get() {
            set_error.set(result.clone().err());
            on_result.run(result);
        }
    });

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if resend_action.pending().get_untracked() {
            return;
        }
        set_error.set(None);
        resend_action.dispatch(email.get_untracked());
    };

    view! {
        <form class="resend-form" on:submit=on_submit>
            <p class="instructions">"Introdu adresa de email pentru a primi un nou link de confirmare."</p>
            <div class="form-group">
                <label for="resend_email">"Email"</label>
                <input
                    type="email"
                    id="resend_email"
                    name="email"
                    autocomplete="email"
                    placeholder="adresa@exemplu.ro"
                    prop:value=email
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
            </div>
            <button type="submit" class="btn btn-primary" disabled=move || resend_action.pending().get()>
                {move || if resend_action.pending().get() { "Se trimite..." } else { "Trimite un nou link" }}
            </button>
            {move || error.get().map(|e| view! { <p class="error">{e.to_string()}</p> })}
        </form>
    }
}
