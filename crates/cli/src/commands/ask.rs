//! `coinclaw ask`: interactive or single-question mode.

use coinclaw_agent::{ConversationMemory, QueryOrchestrator};
use coinclaw_core::answer::AgentAnswer;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_orchestrator, load_config};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config);
    let mut session = orchestrator.new_session();

    if let Some(msg) = message {
        let answer = orchestrator.handle(&mut session, &msg).await;
        print_answer(&answer);
        return Ok(());
    }

    println!();
    println!("  CoinClaw: Interactive Mode");
    println!();
    println!("  Providers: {}", config.providers.enabled_order().join(" -> "));
    println!("  Ask about prices, consensus mechanisms or launch years.");
    println!("  Type 'reset' to forget the conversation, 'exit' or Ctrl+C to quit.");
    println!();

    repl(&orchestrator, &mut session).await
}

async fn repl(
    orchestrator: &QueryOrchestrator,
    session: &mut ConversationMemory,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        match query {
            "" => continue,
            "exit" | "quit" => break,
            "reset" => {
                session.reset();
                println!("  Conversation cleared.\n");
            }
            _ => {
                let answer = orchestrator.handle(session, query).await;
                print_answer(&answer);
                println!();
            }
        }
    }

    println!("  Bye!");
    Ok(())
}

fn print_answer(answer: &AgentAnswer) {
    println!("  {}", answer.text);
    println!(
        "  [source: {}, confidence: {:.1}]",
        answer.provenance.label(),
        answer.confidence
    );
}
