use std::io::{self, BufRead, Write};

use anyhow::Result;
use tutor_core::conversation::{
    ConversationController, ConversationId, ConversationList, Message, MessageRole,
};

use super::ClientContext;

pub async fn list(context: &ClientContext) -> Result<()> {
    let session = context.session()?;
    let mut list = ConversationList::new(context.gateway.clone());
    list.refresh(&session).await?;

    if list.is_empty() {
        println!("No conversations yet.");
    }
    for entry in list.entries() {
        println!("{}  {}", entry.id, entry.title);
    }
    Ok(())
}

pub async fn show(context: &ClientContext, chat_id: String) -> Result<()> {
    let session = context.session()?;
    let mut controller = controller(context);
    controller
        .select_conversation(&session, ConversationId::new(chat_id))
        .await?;

    for message in controller.messages() {
        print_message(message);
    }
    Ok(())
}

pub async fn ask(context: &ClientContext, chat: Option<String>, question: &str) -> Result<()> {
    let session = context.session()?;
    let mut controller = controller(context);

    if let Some(chat_id) = chat {
        // The history is only context here; a failed load does not stop the question.
        if let Err(err) = controller
            .select_conversation(&session, ConversationId::new(chat_id))
            .await
        {
            tracing::warn!(error = %err, "Continuing without history");
        }
    }

    let outcome = controller.send_message(&session, question).await?;
    println!("{}", outcome.reply.content);
    if outcome.created {
        eprintln!("Started conversation {}", outcome.conversation_id);
    }
    Ok(())
}

pub async fn delete(context: &ClientContext, chat_id: String, yes: bool) -> Result<()> {
    let session = context.session()?;
    let id = ConversationId::new(chat_id);
    let mut controller = controller(context);
    // Only the menu needs to be open; the list is not fetched first.
    let mut list = ConversationList::new(context.gateway.clone());
    list.toggle_menu(&id);
    let Some(request) = list.request_delete() else {
        return Ok(());
    };

    if !yes && !confirm(&format!("{} [y/N] ", request.prompt()))? {
        println!("Cancelled.");
        return Ok(());
    }

    list.confirm_delete(request, &mut controller, &session).await?;
    println!("Deleted {}", id);
    Ok(())
}

fn controller(context: &ClientContext) -> ConversationController {
    ConversationController::new(context.gateway.clone(), context.config.greeting.clone())
}

fn print_message(message: &Message) {
    let label = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "tutor",
    };
    println!("[{}]\n{}\n", label, message.content);
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
