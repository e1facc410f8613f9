//! "Sign in with Google" button.
//!
//! Loads the GSI script, renders the button with retry and a visibility
//! fallback, and exchanges the returned credential for an application token.
//! The session is left to the page: `on_success` receives the raw
//! [`AuthResponse`], `on_error` a display message.

use leptos::html::Div;
use leptos::prelude::*;

use crate::identity::bridge::BridgeState;
use crate::net::types::AuthResponse;

#[component]
pub fn GoogleSignInButton(
    on_success: Callback<AuthResponse>,
    on_error: Callback<String>,
) -> impl IntoView {
    let container = NodeRef::<Div>::new();
    let status = RwSignal::new(BridgeState::Unloaded);

    #[cfg(feature = "csr")]
    {
        use tokio_util::sync::CancellationToken;

        let cancel = CancellationToken::new();
        on_cleanup({
            let cancel = cancel.clone();
            move || cancel.cancel()
        });
        let mount = Mount {
            container,
            status,
            credential_holder: StoredValue::new_local(None),
            cancel,
            client_id: use_context::<crate::config::ClientConfig>()
                .unwrap_or_default()
                .google_client_id,
            api: crate::app::use_api().get_value(),
            on_success,
            on_error,
        };
        leptos::task::spawn_local(run_bridge(mount));
    }
    #[cfg(not(feature = "csr"))]
    let _ = (on_success, on_error);

    let failed = move || status.get().is_failed();

    view! {
        <div class="google-signin" data-state=move || format!("{:?}", status.get())>
            <div class="google-signin__button" node_ref=container></div>
            <Show when=failed>
                <p class="google-signin__unavailable">
                    "Google sign-in is unavailable right now."
                </p>
            </Show>
        </div>
    }
}

#[cfg(feature = "csr")]
type CredentialHolder = StoredValue<
    Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    LocalStorage,
>;

/// Everything one mounted button's bridge task needs, captured while the
/// component's owner is still current.
#[cfg(feature = "csr")]
struct Mount {
    container: NodeRef<Div>,
    status: RwSignal<BridgeState>,
    credential_holder: CredentialHolder,
    cancel: tokio_util::sync::CancellationToken,
    client_id: Option<String>,
    api: crate::app::AppApi,
    on_success: Callback<AuthResponse>,
    on_error: Callback<String>,
}

#[cfg(feature = "csr")]
async fn run_bridge(mount: Mount) {
    use wasm_bindgen::JsCast;

    use crate::identity::bridge::{exchange_credential, require_client_id};
    use crate::identity::gsi::{
        DomVisibilityWatch, GlooClock, GsiButton, credential_callback, ensure_script, sdk_loaded,
    };
    use crate::identity::retry::{RenderOutcome, RetryPolicy, render_with_fallback};

    let Mount {
        container,
        status,
        credential_holder,
        cancel,
        client_id,
        api,
        on_success,
        on_error,
    } = mount;
    let advance = move |next: BridgeState| {
        status.try_update(|state| match state.advance(next) {
            Some(advanced) => *state = advanced,
            None => log::debug!("ignoring bridge transition {state:?} -> {next:?}"),
        });
    };

    let client_id = match require_client_id(client_id.as_deref()) {
        Ok(id) => id.to_owned(),
        Err(err) => {
            log::warn!("{err}");
            advance(BridgeState::ConfigError);
            on_error.run(err.to_string());
            return;
        }
    };

    if !sdk_loaded() {
        advance(BridgeState::ScriptLoading);
        if let Err(err) = ensure_script(&cancel).await {
            if !cancel.is_cancelled() {
                advance(BridgeState::ScriptError);
                on_error.run(err.to_string());
            }
            return;
        }
    }
    if cancel.is_cancelled() {
        return;
    }
    advance(BridgeState::Ready);

    let exchange_cancel = cancel.clone();
    let callback = credential_callback(move |credential| {
        let api = api.clone();
        let cancel = exchange_cancel.clone();
        leptos::task::spawn_local(async move {
            let result = exchange_credential(&api, credential.as_deref()).await;
            if cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(response) => on_success.run(response),
                Err(err) => on_error.run(err.to_string()),
            }
        });
    });
    let function = callback
        .as_ref()
        .unchecked_ref::<js_sys::Function>()
        .clone();
    credential_holder.set_value(Some(callback));

    advance(BridgeState::Rendering);
    let mut button = GsiButton::new(container, &client_id, function);
    let mut watch = DomVisibilityWatch::new(container);
    let outcome = render_with_fallback(
        &mut button,
        &GlooClock,
        &mut watch,
        &RetryPolicy::default(),
        &cancel,
        || advance(BridgeState::RenderExhausted),
    )
    .await;

    match outcome {
        RenderOutcome::Rendered {
            attempts,
            via_visibility,
        } => {
            log::debug!(
                "Google button rendered after {attempts} attempt(s) \
                 (visibility fallback: {via_visibility})"
            );
            advance(BridgeState::Rendered);
        }
        RenderOutcome::NotRendered => log::info!("Google button was not rendered"),
        RenderOutcome::Cancelled => {}
    }
}
