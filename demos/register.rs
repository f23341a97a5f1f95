use std::io::{self, BufRead, Write};
use std::sync::Arc;

use queryme_http::{
    chat::check_access,
    endpoint::api_url_from_env,
    registration::{RegistrationFlow, RegistrationForm, SOCIETIES},
    store::FileStore,
    ErrorKind,
};

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let store = Arc::new(FileStore::new(".queryme/state.json"));
    if check_access(store.as_ref()) {
        println!("already logged in");
        return Ok(());
    }

    let mut flow = RegistrationFlow::new(api_url_from_env()?, store.clone());
    let form = RegistrationForm {
        name: prompt("Name")?,
        mobile: prompt("Mobile Number")?,
        society: prompt(&format!("Society {SOCIETIES:?}"))?,
        accepted_terms: prompt("I agree to the Terms and Conditions [y/N]")?
            .eq_ignore_ascii_case("y"),
    };
    flow.submit(&form).await?;
    println!("OTP sent successfully!");

    loop {
        match flow.verify(&prompt("OTP")?).await {
            Ok(message) => {
                println!("{message}");
                break;
            }
            Err(err) if err.kind() == ErrorKind::Validation => println!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
