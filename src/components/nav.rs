use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::SessionVersion;
use crate::server_fns::{get_current_session, SignOut};

#[component]
pub fn Nav() -> impl IntoView {
    let version = SessionVersion::current();
    let user = Resource::new(move || version.get(), |_| get_current_session());
    let sign_out_action = ServerAction::<SignOut>::new();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(())) = sign_out_action.value().get() {
            version.bump();
            navigate("/", Default::default());
        }
    });

    view! {
        <nav class="main-nav">
            <div class="nav-brand">
                <A href="/">"Nexar"</A>
            </div>

            <div class="nav-links">
                <Suspense fallback=|| ()>
                    {move || {
                        user.get().map(|result| match result {
                            Ok(Some(u)) => view! {
                                <span class="user-email">{u.email}</span>
                                {(!u.email_confirmed).then(|| view! {
                                    <span class="badge" title="Verifică-ți emailul pentru linkul de confirmare">
                                        "neconfirmat"
                                    </span>
                                })}
                                <ActionForm action=sign_out_action attr:class="logout-form">
                                    <button type="submit" class="btn btn-small">"Deconectare"</button>
                                </ActionForm>
                            }.into_any(),
                            _ => view! { <A href="/auth">"Conectează-te"</A> }.into_any(),
                        })
                    }}
                </Suspense>
            </div>
        </nav>
    }
}
