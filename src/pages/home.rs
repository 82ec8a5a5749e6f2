use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <section class="hero">
                <h1>"Parley"</h1>
                <p class="subtitle">"An AI assistant that thinks things through with you"</p>
                <p class="description">
                    "Chat with an assistant that can search, run tools, and keep context across "
                    "conversations. Create an account to get started."
                </p>
                <div class="cta-buttons">
                    <A href="/login" attr:class="btn btn-primary">"Get Started"</A>
                    <A href="/register" attr:class="btn btn-secondary">"Create Account"</A>
                </div>
            </section>

            <section class="features">
                <div class="feature">
                    <h3>"Conversations"</h3>
                    <p>"Long-running chats that remember where you left off"</p>
                </div>
                <div class="feature">
                    <h3>"Tools"</h3>
                    <p>"Search, fetch pages, and call plugins from the chat"</p>
                </div>
                <div class="feature">
                    <h3>"Your Account"</h3>
                    <p>"Verified email sign-in keeps your history yours"</p>
                </div>
            </section>
        </div>
    }
}
