use rephrase_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    let client = RephraseClient::from_env()?;
    let mut session = client.session();

    let mut updates = session.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let line = updates
                .borrow_and_update()
                .iter()
                .map(|(style, text)| format!("{style}={}", text.chars().count()))
                .collect::<Vec<_>>()
                .join(" ");
            eprintln!("{line}");
        }
    });

    let state = client
        .run(&mut session, "hey, can u send me the numbers by tmrw?")
        .await?;
    watcher.abort();

    for (style, text) in session.outputs().iter() {
        println!("[{style}] {text}");
    }
    if let Some(failure) = state.failure() {
        eprintln!("run error: {failure}");
    }
    Ok(())
}
