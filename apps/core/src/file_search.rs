//! Client for the third-party file-search engine (the Everything SDK),
//! loaded dynamically so the launcher still runs when the engine is not
//! installed. An absent DLL degrades to an inert source returning nothing;
//! it never blocks startup.

use crate::model::ResultItem;
use crate::source::{SearchSource, SourceError};

#[cfg(target_os = "windows")]
use crate::logging;

pub struct FileSearchSource {
    #[cfg(target_os = "windows")]
    client: Option<EverythingClient>,
    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    max_results: u32,
}

impl FileSearchSource {
    pub fn new(max_results: u16) -> Self {
        #[cfg(target_os = "windows")]
        {
            let client = match EverythingClient::load() {
                Ok(client) => Some(client),
                Err(error) => {
                    logging::warn(&format!(
                        "file search engine unavailable: {error}; file results disabled"
                    ));
                    None
                }
            };
            Self {
                client,
                max_results: u32::from(max_results),
            }
        }

        #[cfg(not(target_os = "windows"))]
        Self {
            max_results: u32::from(max_results),
        }
    }
}

impl SearchSource for FileSearchSource {
    fn source_name(&self) -> &'static str {
        "file-search"
    }

    fn search(&self, query: &str) -> Result<Vec<ResultItem>, SourceError> {
        #[cfg(target_os = "windows")]
        if let Some(client) = &self.client {
            return client.search(query, self.max_results);
        }

        let _ = query;
        Ok(Vec::new())
    }
}

#[cfg(target_os = "windows")]
struct EverythingClient {
    lib: libloading::Library,
    // The SDK keeps query state in process-globals; calls must not overlap.
    lock: std::sync::Mutex<()>,
}

#[cfg(target_os = "windows")]
impl EverythingClient {
    const REQUEST_FILE_NAME: u32 = 0x0000_0001;
    const REQUEST_PATH: u32 = 0x0000_0002;

    fn load() -> Result<Self, SourceError> {
        for candidate in Self::candidate_paths() {
            if !std::path::Path::new(&candidate).exists() {
                continue;
            }
            match unsafe { libloading::Library::new(&candidate) } {
                Ok(lib) => {
                    logging::info(&format!("file search engine loaded from {candidate}"));
                    return Ok(Self {
                        lib,
                        lock: std::sync::Mutex::new(()),
                    });
                }
                Err(error) => {
                    logging::warn(&format!("could not load '{candidate}': {error}"));
                }
            }
        }

        // Last resort: let the loader search PATH.
        match unsafe { libloading::Library::new("Everything64.dll") } {
            Ok(lib) => Ok(Self {
                lib,
                lock: std::sync::Mutex::new(()),
            }),
            Err(error) => Err(SourceError::new(format!(
                "Everything64.dll not found: {error}"
            ))),
        }
    }

    fn candidate_paths() -> Vec<String> {
        let mut candidates = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join("Everything64.dll").to_string_lossy().into_owned());
            }
        }
        candidates.push("Everything64.dll".to_string());
        candidates.push(r"C:\Program Files\Everything\Everything64.dll".to_string());
        candidates.push(r"C:\Program Files (x86)\Everything\Everything64.dll".to_string());
        candidates
    }

    fn search(&self, query: &str, max_results: u32) -> Result<Vec<ResultItem>, SourceError> {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        unsafe {
            let set_search: libloading::Symbol<unsafe extern "system" fn(*const u16)> =
                self.symbol(b"Everything_SetSearchW\0")?;
            let set_flags: libloading::Symbol<unsafe extern "system" fn(u32)> =
                self.symbol(b"Everything_SetRequestFlags\0")?;
            let set_max: libloading::Symbol<unsafe extern "system" fn(u32)> =
                self.symbol(b"Everything_SetMax\0")?;
            let run_query: libloading::Symbol<unsafe extern "system" fn(i32) -> i32> =
                self.symbol(b"Everything_QueryW\0")?;
            let num_results: libloading::Symbol<unsafe extern "system" fn() -> u32> =
                self.symbol(b"Everything_GetNumResults\0")?;
            let result_name: libloading::Symbol<unsafe extern "system" fn(u32) -> *const u16> =
                self.symbol(b"Everything_GetResultFileNameW\0")?;
            let result_path: libloading::Symbol<unsafe extern "system" fn(u32) -> *const u16> =
                self.symbol(b"Everything_GetResultPathW\0")?;

            let wide: Vec<u16> = query.encode_utf16().chain(std::iter::once(0)).collect();
            set_search(wide.as_ptr());
            set_flags(Self::REQUEST_FILE_NAME | Self::REQUEST_PATH);
            set_max(max_results);

            if run_query(1) == 0 {
                return Err(SourceError::new("file search query failed"));
            }

            let count = num_results();
            let mut items = Vec::with_capacity(count as usize);
            for i in 0..count {
                let name = wide_ptr_to_string(result_name(i));
                if name.is_empty() {
                    continue;
                }
                let dir = wide_ptr_to_string(result_path(i));
                let full_path = if dir.is_empty() {
                    name.clone()
                } else {
                    format!("{dir}\\{name}")
                };
                items.push(ResultItem::file(name, full_path));
            }
            Ok(items)
        }
    }

    unsafe fn symbol<T>(&self, name: &[u8]) -> Result<libloading::Symbol<'_, T>, SourceError> {
        self.lib
            .get(name)
            .map_err(|error| SourceError::new(format!("file search symbol missing: {error}")))
    }
}

#[cfg(target_os = "windows")]
unsafe fn wide_ptr_to_string(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0_usize;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}
