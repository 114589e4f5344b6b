use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::{Logo, ResendForm, SessionVersion};
use crate::models::ResendError;
use crate::server_fns::{user_message, SignIn, SignInOutcome};

#[component]
pub fn LoginPage() -> impl IntoView {
    let sign_in_action = ServerAction::<SignIn>::new();
    let version = SessionVersion::current();
    let navigate = use_navigate();
    let (link_sent, set_link_sent) = signal(false);

    Effect::new(move |_| {
        if let Some(Ok(SignInOutcome::SignedIn(_))) = sign_in_action.value().get() {
            version.bump();
            navigate("/", Default::default());
        }
    });

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <Logo/>
                <h1>"Conectare"</h1>

                <ActionForm action=sign_in_action>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input type="email" id="email" name="email" required placeholder="adresa@exemplu.ro"/>
                    </div>

                    <div class="form-group">
                        <label for="password">"Parolă"</label>
                        <input type="password" id="password" name="password" required placeholder="••••••••"/>
                    </div>

                    <button type="submit" class="btn btn-primary" disabled=move || sign_in_action.pending().get()>
                        {move || if sign_in_action.pending().get() { "Se conectează..." } else { "Conectează-te" }}
                    </button>
                </ActionForm>

                // Kept outside the sign-in form: the resend form is a form of its own.
                {move || sign_in_action.value().get().map(|result| match result {
                    Ok(SignInOutcome::SignedIn(_)) => view! {
                        <p class="success">"Conectare reușită! Te redirecționăm..."</p>
                    }.into_any(),
                    Ok(SignInOutcome::EmailNotConfirmed(email)) => view! {
                        <div class="notice">
                            <p>"Contul tău nu este încă confirmat. Folosește linkul din emailul de confirmare sau cere unul nou."</p>
                            <Show
                                when=move || !link_sent.get()
                                fallback=|| view! { <p class="success">"Ți-am trimis un nou link de confirmare."</p> }
                            >
                                <ResendForm
                                    email=email.clone()
                                    on_result={move |r: Result<(), ResendError>| set_link_sent.set(r.is_ok())}
                                />
                            </Show>
                        </div>
                    }.into_any(),
                    Err(e) => view! { <p class="error">{user_message(&e)}</p> }.into_any(),
                })}
            </div>
        </div>
    }
}
