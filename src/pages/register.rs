use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::server_fns::Register;
use crate::verification::storage;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let register_action = ServerAction::<Register>::new();
    let (email, set_email) = signal(String::new());
    let navigate = use_navigate();

    // A new account starts unverified: remember the address for the
    // verification page, then send the user there.
    Effect::new(move |_| {
        if let Some(Ok(_)) = register_action.value().get() {
            let address = email.get_untracked();
            storage::remember_pending_email(&address);
            navigate("/verify-email", Default::default());
        }
    });

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Create Account"</h1>

                <ActionForm action=register_action>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input
                            type="email"
                            id="email"
                            name="email"
                            required
                            placeholder="your@email.com"
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </div>

                    <div class="form-group">
                        <label for="username">"Username"</label>
                        <input
                            type="text"
                            id="username"
                            name="username"
                            required
                            minlength="3"
                            maxlength="30"
                            placeholder="letters, numbers, underscores"
                        />
                    </div>

                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input
                            type="password"
                            id="password"
                            name="password"
                            required
                            minlength="8"
                            placeholder="Minimum 8 characters"
                        />
                    </div>

                    <button type="submit" class="btn btn-primary" disabled=move || register_action.pending().get()>
                        {move || if register_action.pending().get() { "Creating account..." } else { "Create Account" }}
                    </button>

                    {move || register_action.value().get().map(|result| {
                        match result {
                            Ok(_) => view! { <p class="success">"Account created! Redirecting..."</p> }.into_any(),
                            Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                        }
                    })}
                </ActionForm>

                <div class="auth-links">
                    <span>"Already have an account? "</span>
                    <A href="/login">"Sign In"</A>
                </div>
            </div>
        </div>
    }
}
