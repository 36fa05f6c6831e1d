use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use web_sys::HtmlImageElement;

/// Load state of a floor's background image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetStatus {
    #[default]
    Pending,
    Ready,
    /// The image could not be resolved. Only this floor is affected.
    Missing,
}

pub fn floor_image_src(floor: i32) -> String {
    format!("/static/images/floor{floor}.jpg")
}

thread_local! {
    static FLOOR_IMAGES: RefCell<HashMap<i32, HtmlImageElement>> = RefCell::new(HashMap::new());
    static WARNED_FLOORS: RefCell<HashSet<i32>> = RefCell::new(HashSet::new());
}

pub fn floor_image(floor: i32) -> Option<HtmlImageElement> {
    FLOOR_IMAGES.with(|images| images.borrow().get(&floor).cloned())
}

fn warn_floor_once(floor: i32, message: &str) {
    if WARNED_FLOORS.with(|warned| warned.borrow_mut().insert(floor)) {
        web_sys::console::warn_1(&message.into());
    }
}

/// Decode the background image for `floor`. Resolves to the resulting status.
pub async fn load_floor_image(floor: i32) -> AssetStatus {
    if floor_image(floor).is_some() {
        return AssetStatus::Ready;
    }
    let Ok(image) = HtmlImageElement::new() else {
        warn_floor_once(floor, "Failed to create floor image element.");
        return AssetStatus::Missing;
    };
    image.set_src(&floor_image_src(floor));
    match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
        Ok(_) => {
            FLOOR_IMAGES.with(|images| {
                images.borrow_mut().insert(floor, image);
            });
            AssetStatus::Ready
        }
        Err(err) => {
            warn_floor_once(
                floor,
                &format!("Failed to decode floor {floor} image: {:?}", err),
            );
            AssetStatus::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_images_resolve_by_index() {
        assert_eq!(floor_image_src(2), "/static/images/floor2.jpg");
        assert_eq!(AssetStatus::default(), AssetStatus::Pending);
    }
}
