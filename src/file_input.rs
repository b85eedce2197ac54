use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileList};
use tracker_lib::Upload;

/// Largest recording we will read into memory for upload (~200 MB).
const MAX_FILE_SIZE: f64 = 200_000_000.0;

/// First file of a picker or drop, if any.
pub fn first_file(list: Option<FileList>) -> Option<File> {
    list?.get(0)
}

/// Read a picked or dropped file into an [`Upload`]. The error is shown to
/// the user as is.
pub async fn read_upload(file: File) -> Result<Upload, String> {
    let name = file.name();
    let size = file.size();
    if size > MAX_FILE_SIZE {
        return Err(format!(
            "{name} is too large ({:.0} MB), the limit is {:.0} MB",
            size / 1_000_000.0,
            MAX_FILE_SIZE / 1_000_000.0
        ));
    }

    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Could not read {name}: {e:?}"))?
        .dyn_into::<js_sys::ArrayBuffer>()
        .map_err(|_| format!("Could not read {name}"))?;
    let bytes = js_sys::Uint8Array::new(&buf).to_vec();

    log::info!("Read {name}: {} bytes", bytes.len());
    Ok(Upload::new(name, bytes))
}
