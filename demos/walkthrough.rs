use blueprints::{
    try_load_default_config, AddPointRequest, BlueprintsApi, BlueprintsConfig, LoginRequest,
    NewBlueprintRequest, Operation, PointDto,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blueprints=debug,blueprints_store=debug")),
        )
        .init();

    // BLUEPRINTS_* variables or a blueprints.json win over the built-in defaults
    let config = try_load_default_config().unwrap_or_else(BlueprintsConfig::default);
    let api = BlueprintsApi::from_config(&config)?;

    let login = api.login(&LoginRequest {
        username: "student".to_string(),
        password: "student123".to_string(),
    });
    println!("login -> {} {}", login.status, login.body);
    let token = login.body["access_token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("login did not return a token"))?;
    let auth = format!("Bearer {}", token);

    let steps = vec![
        Operation::Create(NewBlueprintRequest {
            author: "student".to_string(),
            name: "house".to_string(),
            points: vec![PointDto { x: 0, y: 0 }, PointDto { x: 10, y: 0 }],
        }),
        Operation::AddPoint {
            author: "student".to_string(),
            name: "house".to_string(),
            point: AddPointRequest { x: 10, y: 10 },
        },
        Operation::GetOne {
            author: "student".to_string(),
            name: "house".to_string(),
        },
        Operation::ListByAuthor {
            author: "nobody".to_string(),
        },
        Operation::ListAll,
    ];

    for op in steps {
        let name = op.name();
        let reply = api.dispatch(Some(&auth), op).await;
        println!("{} -> {} {}", name, reply.status, reply.body);
    }

    let anonymous = api.dispatch(None, Operation::ListAll).await;
    println!("anonymous list_all -> {} {}", anonymous.status, anonymous.body);

    Ok(())
}
