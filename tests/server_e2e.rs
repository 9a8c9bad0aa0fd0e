/// E2E tests against a server bound to a random local port.
mod common;

use reqwest::{redirect, Client, StatusCode};
use serde_json::{json, Value};

use common::{test_state, ADMIN_EMAIL, ADMIN_PASSWORD};

async fn spawn_server() -> (tempfile::TempDir, String) {
    let (tmp, state) = test_state().await;
    let app = atelier::routes::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (tmp, format!("http://{}", addr))
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn sign_in_then_manage_reviews() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, base) = spawn_server().await;
    let client = client();

    let response = client
        .post(format!("{}/admin/login", base))
        .form(&[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.cookies().any(|c| c.name() == "atelier_session"));

    let mut ids = Vec::new();
    for name in ["Aida", "Bakyt", "Cholpon"] {
        let created: Value = client
            .post(format!("{}/admin/api/reviews", base))
            .json(&json!({ "name": name, "url": "https://www.instagram.com/p/abc/" }))
            .send()
            .await?
            .json()
            .await?;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let response = client
        .post(format!("{}/admin/api/reviews/reorder", base))
        .json(&json!({ "ids": [ids[2], ids[0], ids[1]] }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let listed: Vec<Value> = client
        .get(format!("{}/admin/api/reviews", base))
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = listed.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Cholpon", "Aida", "Bakyt"]);

    // Landing page lists reviews in the new order.
    let html = client.get(&base).send().await?.text().await?;
    let cholpon = html.find("Cholpon").unwrap();
    let aida = html.find("Aida").unwrap();
    assert!(cholpon < aida);

    let response = client
        .post(format!("{}/admin/logout", base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .get(format!("{}/admin/api/reviews", base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn contact_form_accepts_formatted_numbers() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, base) = spawn_server().await;
    let client = client();

    let response = client
        .post(format!("{}/contact", base))
        .form(&[
            ("name", "Nurlan"),
            ("phone", "+996 (700) 11-22-33"),
            ("comment", "Wardrobe for the hallway"),
        ])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.contains("Thank you"));

    let response = client
        .post(format!("{}/contact", base))
        .form(&[("name", ""), ("phone", "0700112233")])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}
