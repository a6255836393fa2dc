//! Citra Launcher Android JNI Bindings
//!
//! Backs the native methods of `org.citra_emu.citra.MainActivity`: the
//! activity forwards its button press and `onActivityResult` here, and the
//! launcher shim resolves the picked document and calls the core's `Load`.

use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jni::objects::{JClass, JObject, JString, JValue};
use jni::sys::jint;
use jni::JNIEnv;

use citra_launcher::config::CONFIG_FILE_NAME;
use citra_launcher::log_filter::{LogFilter, CORE, FRONTEND};
use citra_launcher::logging::{LogRouter, RoutedLogger};
use citra_launcher::picker::{PickerError, READ_REQUEST_CODE};
use citra_launcher::{
    Completion, DocumentRequest, FilePicker, LauncherConfig, LauncherSession, NativeCore,
    ResourceHandle, ResultStatus, Selection,
};

/// Core library looked up when the configuration names none
const DEFAULT_CORE_LIBRARY: &str = "libcitra-core.so";

const ACTION_OPEN_DOCUMENT: &str = "android.intent.action.OPEN_DOCUMENT";

type AndroidSession = LauncherSession<NativeCore>;

static STATE: Mutex<Option<AndroidSession>> = Mutex::new(None);

/// Completion for the open-document activity currently on screen
static COMPLETION: Mutex<Option<Completion>> = Mutex::new(None);

/// Class filter and log file behind the installed logger
static LOG_ROUTER: LogRouter = LogRouter::new();

fn with_session<T>(f: impl FnOnce(&mut AndroidSession) -> T) -> Option<T> {
    match STATE.lock() {
        Ok(mut state) => Some(f(state.get_or_insert_with(AndroidSession::default))),
        Err(e) => {
            log::error!(target: FRONTEND, "Failed to lock launcher state: {}", e);
            None
        }
    }
}

fn open_core(config: &LauncherConfig) -> Option<NativeCore> {
    let library = config
        .core_library
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CORE_LIBRARY));

    match NativeCore::open(&library, &config.entry_symbol) {
        Ok(core) => Some(core),
        Err(e) => {
            log::error!(target: CORE, "Failed to open native core: {}", e);
            None
        }
    }
}

fn apply_log_filter(filter: &str) {
    log::set_max_level(LOG_ROUTER.set_filter(LogFilter::parse(filter)));
}

/// Run a JNI body, logging instead of unwinding into the JVM
fn guarded<T>(name: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(panic::AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(e) => {
            log::error!(target: FRONTEND, "Panic in {}: {:?}", name, e);
            fallback
        }
    }
}

fn read_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    if value.is_null() {
        return None;
    }
    match env.get_string(value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            log::error!(target: FRONTEND, "Failed to read Java string: {}", e);
            None
        }
    }
}

// ============================================================================
// File picker
// ============================================================================

/// Starts `ACTION_OPEN_DOCUMENT` on the calling activity; the answer comes back
/// through `onSelectionComplete`
struct ActivityPicker<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    activity: &'a JObject<'local>,
}

impl ActivityPicker<'_, '_> {
    fn start(&mut self, request: &DocumentRequest) -> jni::errors::Result<()> {
        let action = self.env.new_string(ACTION_OPEN_DOCUMENT)?;
        let intent = self.env.new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&action)],
        )?;

        let mime_type = self.env.new_string(&request.mime_type)?;
        self.env.call_method(
            &intent,
            "setType",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&mime_type)],
        )?;

        self.env.call_method(
            self.activity,
            "startActivityForResult",
            "(Landroid/content/Intent;I)V",
            &[JValue::Object(&intent), JValue::Int(request.request_code)],
        )?;
        Ok(())
    }
}

impl FilePicker for ActivityPicker<'_, '_> {
    fn open_document(
        &mut self,
        request: &DocumentRequest,
        completion: Completion,
    ) -> Result<(), PickerError> {
        match COMPLETION.lock() {
            Ok(mut slot) => *slot = Some(completion),
            Err(e) => return Err(PickerError::Unavailable(e.to_string())),
        }

        if let Err(e) = self.start(request) {
            if self.env.exception_check().unwrap_or(false) {
                let _ = self.env.exception_describe();
                let _ = self.env.exception_clear();
            }
            if let Ok(mut slot) = COMPLETION.lock() {
                slot.take();
            }
            return Err(PickerError::LaunchFailed(e.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// JNI Functions
// ============================================================================

/// Install the Android logger and apply the configured log filter
#[no_mangle]
pub extern "system" fn Java_org_citra_1emu_citra_MainActivity_initLogging(
    _env: JNIEnv,
    _class: JClass,
) {
    let platform = android_logger::AndroidLogger::new(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Trace)
            .with_tag("Citra"),
    );
    let installed = log::set_boxed_logger(Box::new(RoutedLogger::new(platform, &LOG_ROUTER))).is_ok();

    // Parse once the logger is up so malformed entries get reported
    if let Some(filter) = with_session(|session| session.config().log_filter.clone()) {
        apply_log_filter(&filter);
    }

    if installed {
        log::info!(target: FRONTEND, "Citra launcher logging initialized");
    }
}

/// Record the app's private directories, start the log file and load the
/// launcher configuration
#[no_mangle]
pub extern "system" fn Java_org_citra_1emu_citra_MainActivity_setFilePaths<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    external_file_path: JString<'local>,
    cache_path: JString<'local>,
) {
    guarded("setFilePaths", (), || {
        let Some(external) = read_string(&mut env, &external_file_path) else {
            log::error!(target: FRONTEND, "setFilePaths called without an external files path");
            return;
        };
        let external = Path::new(&external);

        match LOG_ROUTER.attach_file(&external.join("log")) {
            Ok(path) => log::info!(target: FRONTEND, "Log file: {}", path.display()),
            Err(e) => log::warn!(target: FRONTEND, "Could not create log file: {}", e),
        }
        if let Some(cache) = read_string(&mut env, &cache_path) {
            log::debug!(target: FRONTEND, "Cache path: {}", cache);
        }

        let config_path = external.join("config").join(CONFIG_FILE_NAME);
        let config = LauncherConfig::load_or_default(&config_path);
        apply_log_filter(&config.log_filter);

        with_session(|session| session.apply_config(config, Some(config_path)));
    })
}

/// Show the system document chooser
#[no_mangle]
pub extern "system" fn Java_org_citra_1emu_citra_MainActivity_requestFileSelection<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
) {
    log::info!(target: FRONTEND, "requestFileSelection called");

    guarded("requestFileSelection", (), || {
        let Some(mut checkout) = with_session(|session| session.checkout(open_core)).flatten() else {
            return;
        };

        let mut picker = ActivityPicker {
            env: &mut env,
            activity: &activity,
        };
        // Failures are already logged by the shim
        let _ = checkout.shim.request_file_selection(&mut picker);

        with_session(|session| session.checkin(checkout, None));
    })
}

/// Forwarded from `onActivityResult`; `uri` is the result intent's data or null
#[no_mangle]
pub extern "system" fn Java_org_citra_1emu_citra_MainActivity_onSelectionComplete<'local>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    request_code: jint,
    result_code: jint,
    uri: JString<'local>,
) {
    guarded("onSelectionComplete", (), || {
        if request_code != READ_REQUEST_CODE {
            log::debug!(target: FRONTEND, "Ignoring activity result for request {}", request_code);
            return;
        }

        let completion = match COMPLETION.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                log::error!(target: FRONTEND, "Failed to lock completion slot: {}", e);
                None
            }
        };
        let selection = Selection {
            status: ResultStatus::from_code(result_code),
            handle: read_string(&mut env, &uri).map(ResourceHandle::from),
        };

        let Some(mut checkout) = with_session(|session| session.checkout(open_core)).flatten() else {
            if let Some(completion) = completion {
                completion.cancel();
            }
            return;
        };
        let outcome = checkout.deliver(completion, selection);

        with_session(|session| session.checkin(checkout, Some(&outcome)));
    })
}

/// Load a game directly from a path or document URI
#[no_mangle]
pub extern "system" fn Java_org_citra_1emu_citra_MainActivity_Load<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    jpath: JString<'local>,
) {
    guarded("Load", (), || {
        let Some(path) = read_string(&mut env, &jpath) else {
            log::error!(target: FRONTEND, "Load called without a path");
            return;
        };

        let Some(mut checkout) = with_session(|session| session.checkout(open_core)).flatten() else {
            return;
        };
        let outcome = checkout
            .shim
            .on_selection_complete(ResultStatus::Ok, Some(ResourceHandle::from(path)));

        with_session(|session| session.checkin(checkout, Some(&outcome)));
    })
}
