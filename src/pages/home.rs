use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <section class="hero">
                <h1>"Nexar"</h1>
                <p class="subtitle">"Marketplace-ul tău de încredere"</p>
                <div class="cta-buttons">
                    <A href="/auth" attr:class="btn btn-primary">"Conectează-te"</A>
                </div>
            </section>
        </div>
    }
}
