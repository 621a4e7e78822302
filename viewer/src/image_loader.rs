use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use dashmap::{DashMap, DashSet};
use raylib::texture::{Image, Texture2D};
use raylib::{RaylibHandle, RaylibThread};
use tracing::warn;

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/**
 * Collection image cache. Bytes are downloaded on a worker thread, textures
 * are created on the main thread since OpenGL only allows texture loading
 * from the thread its context was created on.
 */
pub struct ImageLoader {
    http: reqwest::blocking::Client,
    // to avoid duplicate concurrent fetches
    in_flight: Arc<DashSet<String>>,
    raw_bytes: Arc<DashMap<String, Vec<u8>>>,
    failed: Arc<DashSet<String>>,
    textures: HashMap<String, Texture2D>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            in_flight: Arc::new(DashSet::new()),
            raw_bytes: Arc::new(DashMap::new()),
            failed: Arc::new(DashSet::new()),
            textures: HashMap::new(),
        }
    }

    /// Does not block. Uploads downloaded bytes as a texture, or schedules the
    /// download when nothing is there yet.
    pub fn load(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, url: &str) {
        if url.is_empty() || self.failed.contains(url) || self.textures.contains_key(url) {
            return;
        }

        match self.raw_bytes.remove(url) {
            Some((_, bytes)) => match load_texture(rl, thread, url, &bytes) {
                Some(texture) => {
                    self.textures.insert(url.to_string(), texture);
                }
                None => {
                    self.failed.insert(url.to_string());
                }
            },
            None => self.spawn_fetch(url),
        }
    }

    pub fn get(&self, url: &str) -> Option<&Texture2D> {
        self.textures.get(url)
    }

    fn spawn_fetch(&self, url: &str) {
        if !self.in_flight.insert(url.to_string()) {
            return;
        }

        let key = url.to_string();
        let http = self.http.clone();
        let raw_bytes = Arc::clone(&self.raw_bytes);
        let failed = Arc::clone(&self.failed);
        let in_flight = Arc::clone(&self.in_flight);
        thread::spawn(move || {
            match fetch_bytes(&http, &key) {
                Ok(bytes) => {
                    raw_bytes.insert(key.clone(), bytes);
                }
                Err(e) => {
                    warn!(url = %key, error = %e, "image fetch failed");
                    failed.insert(key.clone());
                }
            }
            in_flight.remove(&key);
        });
    }
}

fn fetch_bytes(http: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let resp = http.get(gateway_url(url)).send()?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

fn load_texture(rl: &mut RaylibHandle, thread: &RaylibThread, url: &str, bytes: &[u8]) -> Option<Texture2D> {
    let img = match Image::load_image_from_mem(file_type(url), bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(%url, error = %e, "image decode failed");
            return None;
        }
    };
    match rl.load_texture_from_image(thread, &img) {
        Ok(texture) => Some(texture),
        Err(e) => {
            warn!(%url, error = %e, "texture upload failed");
            None
        }
    }
}

pub fn gateway_url(url: &str) -> String {
    match url.strip_prefix("ipfs://") {
        Some(cid) => format!("{IPFS_GATEWAY}{}", cid.trim_start_matches("ipfs/")),
        None => url.to_string(),
    }
}

/// raylib picks the decoder from the extension, png when the url has none.
pub fn file_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        ".jpg"
    } else if path.ends_with(".gif") {
        ".gif"
    } else if path.ends_with(".bmp") {
        ".bmp"
    } else {
        ".png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipfs_urls_go_through_gateway() {
        assert_eq!(gateway_url("ipfs://bafy/1.png"), "https://ipfs.io/ipfs/bafy/1.png");
        assert_eq!(gateway_url("ipfs://ipfs/bafy"), "https://ipfs.io/ipfs/bafy");
        assert_eq!(gateway_url("https://arweave.net/x"), "https://arweave.net/x");
    }

    #[test]
    fn file_type_from_extension() {
        assert_eq!(file_type("https://x/a.JPG?v=2"), ".jpg");
        assert_eq!(file_type("https://x/a.gif"), ".gif");
        assert_eq!(file_type("https://arweave.net/abc"), ".png");
    }
}
