use std::fmt::Display;
use sllist::List;

fn print<T: Display>(list: &List<T>) {
  list.traverse(|x| print!("{} -> ", x));
  println!("NULL");
}

fn main() {
  let mut list = List::new();

  list.insert_front(10);
  list.insert_front(42);
  list.insert_end(20);
  print(&list);

  match list.insert_at(2, 7) {
    Ok(()) => print(&list),
    Err(e) => println!("{}", e),
  }

  if let Err(e) = list.insert_at(10, 0) {
    println!("{}", e);
  }

  let _ = list.remove_front();
  let _ = list.remove_end();
  print(&list);

  println!("length: {}", list.len());

  list.destroy();
}
