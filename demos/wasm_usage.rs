//! Example of exposing runtime data to JavaScript
//!
//! To build for WASM:
//! cargo build --example wasm_usage --target wasm32-unknown-unknown --features wasm

use runtime_data::{KnownFields, RuntimeData};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct RuntimeDataHandle {
    data: RuntimeData,
}

fn to_js(e: runtime_data::RuntimeDataError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl RuntimeDataHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<RuntimeDataHandle, JsValue> {
        // In WASM, data lives in localStorage["runtimeData"]
        let data = RuntimeData::for_app("com.example.password-manager").map_err(to_js)?;
        Ok(RuntimeDataHandle { data })
    }

    pub fn init(&mut self) -> Result<(), JsValue> {
        self.data.init().map_err(to_js)
    }

    /// Returns the JSON encoding of the value, or `undefined` when absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|value| value.to_string())
    }

    /// Takes a JSON-encoded value; returns whether it changed.
    pub fn set(&mut self, key: &str, json: &str) -> Result<bool, JsValue> {
        let value: runtime_data::serde_json::Value = runtime_data::serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid JSON: {}", e)))?;
        self.data.set(key, value).map_err(to_js)
    }

    pub fn delete(&mut self, key: &str) -> Result<(), JsValue> {
        self.data.delete(key).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.data.to_json_string().map_err(to_js)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.data.reset().map_err(to_js)
    }

    #[wasm_bindgen(js_name = disableSaveOnChange)]
    pub fn disable_save_on_change(&mut self) {
        self.data.disable_save_on_change();
    }

    #[wasm_bindgen(getter, js_name = skipFolderRightsWarning)]
    pub fn skip_folder_rights_warning(&self) -> Option<bool> {
        self.data.skip_folder_rights_warning()
    }

    #[wasm_bindgen(setter, js_name = skipFolderRightsWarning)]
    pub fn set_skip_folder_rights_warning(&mut self, value: bool) -> Result<(), JsValue> {
        self.data
            .set_skip_folder_rights_warning(value)
            .map(|_| ())
            .map_err(to_js)
    }
}

// This would be called from JavaScript when the module loads
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}
