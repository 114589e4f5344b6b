use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use crate::components::{Nav, SessionVersion};
use crate::pages::*;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    SessionVersion::provide();

    view! {
        <Stylesheet id="leptos" href="/pkg/nexar.css"/>
        <Title text="Nexar"/>
        <Meta name="description" content="Nexar - marketplace"/>

        <Router>
            <Nav/>
            <main>
                <Routes fallback=|| view! { <h1>"404 - Pagina nu a fost găsită"</h1> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/auth") view=LoginPage/>
                    <Route path=path!("/auth/confirm") view=AuthConfirmPage/>
                </Routes>
            </main>
        </Router>
    }
}
