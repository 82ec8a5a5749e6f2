use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::server_fns::{get_current_user, ResendVerification, VerifyEmail};
use crate::verification::{storage, Effect as FlowEffect, Event, Machine, Status, VerificationQuery};

/// Driver for the verification state machine. Resolves the query, feeds
/// events into the machine through a single dispatch path, and runs whatever
/// effects come back. All rendering goes through [`VerificationStatus`].
#[component]
pub fn VerifyEmailPage() -> impl IntoView {
    let query_map = use_query_map();
    let navigate = use_navigate();
    let user = Resource::new(|| (), |_| get_current_user());

    let machine = RwSignal::new(Machine::new());
    // Flipped once the mount guards have run, so nothing renders before the
    // redirect checks had their chance.
    let (checked, set_checked) = signal(false);
    let verify_action = ServerAction::<VerifyEmail>::new();
    let resend_action = ServerAction::<ResendVerification>::new();

    let query = Memo::new(move |_| {
        let q = query_map.read();
        VerificationQuery::resolve(
            q.get("email").as_deref(),
            q.get("token").as_deref(),
            q.get("already_verified").as_deref(),
            q.get("verification_failed").as_deref(),
            storage::pending_email().as_deref(),
        )
    });

    let dispatch = move |event: Event| {
        // try_update so a callback landing after the page is torn down is
        // dropped instead of touching a disposed signal.
        let effects = machine.try_update(|m| m.apply(event)).unwrap_or_default();
        for effect in effects {
            match effect {
                FlowEffect::Verify(token) => {
                    verify_action.dispatch(VerifyEmail { token });
                }
                FlowEffect::Resend(email) => {
                    resend_action.dispatch(ResendVerification { email });
                }
                FlowEffect::ClearPendingEmail => storage::clear_pending_email(),
                FlowEffect::Navigate(dest) => navigate(dest.path(), Default::default()),
            }
        }
    };

    // Auth snapshot, then the query, in that order: a logged-in user
    // redirects before any query guard can start a verify.
    {
        let dispatch = dispatch.clone();
        Effect::new(move |_| {
            let Some(current) = user.get() else { return };
            let authenticated = matches!(current, Ok(Some(_)));
            dispatch(Event::MountChecked { authenticated });
            dispatch(Event::QueryResolved(query.get()));
            set_checked.set(true);
        });
    }

    {
        let dispatch = dispatch.clone();
        Effect::new(move |_| {
            if let Some(result) = verify_action.value().get() {
                match result {
                    Ok(_) => dispatch(Event::VerifySucceeded),
                    Err(e) => dispatch(Event::VerifyFailed(failure_reason(&e))),
                }
            }
        });
    }

    {
        let dispatch = dispatch.clone();
        Effect::new(move |_| {
            if let Some(result) = resend_action.value().get() {
                match result {
                    Ok(_) => dispatch(Event::ResendSucceeded),
                    Err(e) => dispatch(Event::ResendFailed(failure_reason(&e))),
                }
            }
        });
    }

    let on_resend = Callback::new(move |_: ()| {
        dispatch(Event::ResendRequested {
            email: query.get_untracked().email,
        });
    });

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <Suspense fallback=|| view! { <div class="loading">"Loading..."</div> }>
                    {move || {
                        user.get().map(|_| {
                            if !checked.get() {
                                return view! { <div class="loading">"Loading..."</div> }.into_any();
                            }
                            match machine.read().state.status() {
                                None => view! {
                                    <div class="loading">"Redirecting..."</div>
                                }.into_any(),
                                Some(_) => view! {
                                    <VerificationStatus
                                        status=Signal::derive(move || {
                                            machine.read().state.status().unwrap_or(Status::Pending)
                                        })
                                        message=Signal::derive(move || machine.read().message.clone())
                                        email=Signal::derive(move || query.get().email)
                                        on_resend=on_resend
                                        is_resending=Signal::derive(move || {
                                            machine.read().state.is_resending()
                                        })
                                    />
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </div>
        </div>
    }
}

/// Pull the human-readable reason out of a failed server call, if it carried
/// one. Transport-level failures get the machine's generic fallback instead.
fn failure_reason(err: &ServerFnError) -> Option<String> {
    match err {
        ServerFnError::ServerError(msg) => Some(msg.clone()),
        _ => None,
    }
}

/// Pure presentation of the controller surface:
/// status, message, email, resend callback, resend-in-flight flag.
#[component]
fn VerificationStatus(
    status: Signal<Status>,
    message: Signal<String>,
    email: Signal<String>,
    on_resend: Callback<()>,
    is_resending: Signal<bool>,
) -> impl IntoView {
    let heading = move || match status.get() {
        Status::Pending => "Check Your Email",
        Status::Verifying => "Verifying...",
        Status::Error => "Verification Failed",
        Status::Success => "Email Verified",
    };

    let sub_text = move || match status.get() {
        Status::Pending => {
            let email = email.get();
            if email.is_empty() {
                "We sent a verification link to your email.".to_string()
            } else {
                format!("We sent a verification link to {email}")
            }
        }
        Status::Verifying => "Please wait while we verify your email...".to_string(),
        Status::Error => message.get(),
        Status::Success => message.get(),
    };

    let heading_class = move || match status.get() {
        Status::Error => "status-heading error",
        _ => "status-heading",
    };

    let can_resend = move || matches!(status.get(), Status::Pending | Status::Error);
    let show_back_link =
        move || !matches!(status.get(), Status::Verifying | Status::Success);

    view! {
        <div class="verification-status">
            <h1 class=heading_class>{heading}</h1>
            <p class="status-text">{sub_text}</p>

            <Show when=move || {
                status.get() == Status::Pending && !message.get().is_empty()
            }>
                <p class="success">{move || message.get()}</p>
            </Show>

            <Show when=can_resend>
                <button
                    class="btn btn-primary"
                    disabled=move || is_resending.get()
                    on:click=move |_| on_resend.run(())
                >
                    {move || if is_resending.get() { "Sending..." } else { "Resend Verification Email" }}
                </button>
            </Show>

            <Show when=move || status.get() == Status::Success>
                <A href="/login" attr:class="btn btn-primary">"Continue to Login"</A>
            </Show>

            <Show when=show_back_link>
                <A href="/login" attr:class="btn btn-secondary">"Back to Login"</A>
            </Show>

            <Show when=move || status.get() == Status::Pending>
                <div class="hints">
                    <p>"Can't find the email? Check your spam folder."</p>
                    <p>"The verification link will expire in 24 hours."</p>
                </div>
            </Show>
        </div>
    }
}
