//! Flex message documents.
//!
//! Built as JSON values: the flex schema is large and the bot only sends fixed
//! documents, so typed containers would add nothing over `json!`.

use serde_json::{json, Value};

const SHOP_URI: &str = "https://linecorp.com";

/// A product shown in one carousel bubble.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    pub name: &'a str,
    pub image_url: &'a str,
    /// Integer part of the price including currency sign, e.g. "$49".
    pub price: &'a str,
    /// Fractional part, e.g. ".99".
    pub cents: &'a str,
    /// Shown in red under the price and greys out the cart button.
    pub out_of_stock: bool,
}

const PRODUCTS: [Product<'static>; 2] = [
    Product {
        name: "Arm Chair, White",
        image_url: "https://scdn.line-apps.com/n/channel_devcenter/img/fx/01_5_carousel.png",
        price: "$49",
        cents: ".99",
        out_of_stock: false,
    },
    Product {
        name: "Metal Desk Lamp",
        image_url: "https://scdn.line-apps.com/n/channel_devcenter/img/fx/01_6_carousel.png",
        price: "$11",
        cents: ".99",
        out_of_stock: true,
    },
];

/// Alt text shown in notifications and on clients that cannot render flex.
pub const PRODUCT_CAROUSEL_ALT_TEXT: &str = "Product carousel";

/// The shopping carousel: one bubble per product plus a trailing "See more" bubble.
pub fn product_carousel() -> Value {
    let mut bubbles: Vec<Value> = PRODUCTS.iter().map(product_bubble).collect();
    bubbles.push(see_more_bubble());
    json!({
        "type": "carousel",
        "contents": bubbles,
    })
}

fn price_text(text: &str, size: &str) -> Value {
    json!({
        "type": "text",
        "text": text,
        "wrap": true,
        "weight": "bold",
        "size": size,
        "flex": 0
    })
}

fn uri_button(label: &str) -> Value {
    json!({
        "type": "button",
        "action": { "type": "uri", "label": label, "uri": SHOP_URI }
    })
}

pub fn product_bubble(product: &Product<'_>) -> Value {
    let mut body = vec![
        json!({
            "type": "text",
            "text": product.name,
            "wrap": true,
            "weight": "bold",
            "size": "xl"
        }),
        json!({
            "type": "box",
            "layout": "baseline",
            "contents": [price_text(product.price, "xl"), price_text(product.cents, "sm")]
        }),
    ];
    let mut cart = uri_button("Add to Cart");
    cart["style"] = json!("primary");
    if product.out_of_stock {
        body.push(json!({
            "type": "text",
            "text": "Temporarily out of stock",
            "wrap": true,
            "size": "xxs",
            "margin": "md",
            "color": "#ff5551",
            "flex": 0
        }));
        cart["color"] = json!("#aaaaaa");
    }
    json!({
        "type": "bubble",
        "hero": {
            "type": "image",
            "size": "full",
            "aspectRatio": "20:13",
            "aspectMode": "cover",
            "url": product.image_url
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": body
        },
        "footer": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": [cart, uri_button("Add to wishlist")]
        }
    })
}

fn see_more_bubble() -> Value {
    let mut button = uri_button("See more");
    button["flex"] = json!(1);
    button["gravity"] = json!("center");
    json!({
        "type": "bubble",
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": [button]
        }
    })
}
